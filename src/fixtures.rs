//! Synthetic DICOM files for tests.

use std::{fs, path::Path};

use dicom::{
    core::{DataElement, PrimitiveValue, VR},
    object::{FileMetaTableBuilder, InMemDicomObject},
};
use dicom_dictionary_std::tags;

const EXPLICIT_VR_LITTLE_ENDIAN: &str = "1.2.840.10008.1.2.1";
const SECONDARY_CAPTURE_IMAGE_STORAGE: &str = "1.2.840.10008.5.1.4.1.1.7";

pub(crate) struct Fixture {
    frames: u32,
    rows: u16,
    columns: u16,
    samples_per_pixel: u16,
    bits_allocated: u16,
    pixel_representation: u16,
    photometric_interpretation: &'static str,
    pixel_data: Option<(VR, PrimitiveValue)>,
}

impl Fixture {
    pub(crate) fn mono16(frames: u32, rows: u16, columns: u16, values: Vec<u16>) -> Self {
        assert_eq!(values.len(), frames as usize * rows as usize * columns as usize);
        Self {
            frames,
            rows,
            columns,
            samples_per_pixel: 1,
            bits_allocated: 16,
            pixel_representation: 0,
            photometric_interpretation: "MONOCHROME2",
            pixel_data: Some((VR::OW, PrimitiveValue::U16(values.into()))),
        }
    }

    pub(crate) fn mono8(frames: u32, rows: u16, columns: u16, values: Vec<u8>) -> Self {
        assert_eq!(values.len(), frames as usize * rows as usize * columns as usize);
        Self {
            frames,
            rows,
            columns,
            samples_per_pixel: 1,
            bits_allocated: 8,
            pixel_representation: 0,
            photometric_interpretation: "MONOCHROME2",
            pixel_data: Some((VR::OB, PrimitiveValue::U8(values.into()))),
        }
    }

    pub(crate) fn mono32(frames: u32, rows: u16, columns: u16, values: Vec<u32>) -> Self {
        assert_eq!(values.len(), frames as usize * rows as usize * columns as usize);
        Self {
            frames,
            rows,
            columns,
            samples_per_pixel: 1,
            bits_allocated: 32,
            pixel_representation: 0,
            photometric_interpretation: "MONOCHROME2",
            pixel_data: Some((VR::OL, PrimitiveValue::U32(values.into()))),
        }
    }

    /// Mark the samples as two's complement. Values are given as their raw bit patterns.
    pub(crate) fn signed(mut self) -> Self {
        self.pixel_representation = 1;
        self
    }

    pub(crate) fn rgb8(rows: u16, columns: u16, values: Vec<u8>) -> Self {
        assert_eq!(values.len(), 3 * rows as usize * columns as usize);
        Self {
            frames: 1,
            rows,
            columns,
            samples_per_pixel: 3,
            bits_allocated: 8,
            pixel_representation: 0,
            photometric_interpretation: "RGB",
            pixel_data: Some((VR::OB, PrimitiveValue::U8(values.into()))),
        }
    }

    /// A header that parses but carries no pixel data to decode.
    pub(crate) fn header_only(rows: u16, columns: u16) -> Self {
        Self {
            frames: 1,
            rows,
            columns,
            samples_per_pixel: 1,
            bits_allocated: 16,
            pixel_representation: 0,
            photometric_interpretation: "MONOCHROME2",
            pixel_data: None,
        }
    }

    pub(crate) fn write(self, path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }

        let mut object = InMemDicomObject::new_empty();
        object.put(DataElement::new(
            tags::SOP_CLASS_UID,
            VR::UI,
            PrimitiveValue::from(SECONDARY_CAPTURE_IMAGE_STORAGE),
        ));
        object.put(DataElement::new(
            tags::SOP_INSTANCE_UID,
            VR::UI,
            PrimitiveValue::from("2.25.1234567890"),
        ));
        object.put(DataElement::new(
            tags::SAMPLES_PER_PIXEL,
            VR::US,
            PrimitiveValue::from(self.samples_per_pixel),
        ));
        object.put(DataElement::new(
            tags::PHOTOMETRIC_INTERPRETATION,
            VR::CS,
            PrimitiveValue::from(self.photometric_interpretation),
        ));
        if self.samples_per_pixel > 1 {
            object.put(DataElement::new(
                tags::PLANAR_CONFIGURATION,
                VR::US,
                PrimitiveValue::from(0_u16),
            ));
        }
        object.put(DataElement::new(
            tags::NUMBER_OF_FRAMES,
            VR::IS,
            PrimitiveValue::from(self.frames.to_string()),
        ));
        object.put(DataElement::new(
            tags::ROWS,
            VR::US,
            PrimitiveValue::from(self.rows),
        ));
        object.put(DataElement::new(
            tags::COLUMNS,
            VR::US,
            PrimitiveValue::from(self.columns),
        ));
        object.put(DataElement::new(
            tags::BITS_ALLOCATED,
            VR::US,
            PrimitiveValue::from(self.bits_allocated),
        ));
        object.put(DataElement::new(
            tags::BITS_STORED,
            VR::US,
            PrimitiveValue::from(self.bits_allocated),
        ));
        object.put(DataElement::new(
            tags::HIGH_BIT,
            VR::US,
            PrimitiveValue::from(self.bits_allocated - 1),
        ));
        object.put(DataElement::new(
            tags::PIXEL_REPRESENTATION,
            VR::US,
            PrimitiveValue::from(self.pixel_representation),
        ));
        if let Some((vr, value)) = self.pixel_data {
            object.put(DataElement::new(tags::PIXEL_DATA, vr, value));
        }

        let file = object
            .with_meta(
                FileMetaTableBuilder::new()
                    .transfer_syntax(EXPLICIT_VR_LITTLE_ENDIAN)
                    .media_storage_sop_class_uid(SECONDARY_CAPTURE_IMAGE_STORAGE)
                    .media_storage_sop_instance_uid("2.25.1234567890"),
            )
            .unwrap();
        file.write_to_file(path).unwrap();
    }
}

pub(crate) fn write_text(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// Values increasing linearly across the whole volume.
pub(crate) fn ramp(frames: u32, rows: u16, columns: u16) -> Vec<u16> {
    let len = frames as usize * rows as usize * columns as usize;
    (0..len).map(|v| (v % usize::from(u16::MAX)) as u16).collect()
}

pub(crate) struct DecodedGif {
    pub(crate) width: u16,
    pub(crate) height: u16,
    pub(crate) repeat: Option<gif::Repeat>,
    /// Delay and palette indices of every frame.
    pub(crate) frames: Vec<(u16, Vec<u8>)>,
}

/// Loop count stored in the NETSCAPE2.0 application extension.
fn netscape_repeat(bytes: &[u8]) -> Option<gif::Repeat> {
    const ID: &[u8] = b"NETSCAPE2.0";
    let start = bytes.windows(ID.len()).position(|window| window == ID)? + ID.len();
    match bytes.get(start..start + 4)? {
        [3, 1, lo, hi] => Some(match u16::from_le_bytes([*lo, *hi]) {
            0 => gif::Repeat::Infinite,
            count => gif::Repeat::Finite(count),
        }),
        _ => None,
    }
}

pub(crate) fn read_gif(path: &Path) -> DecodedGif {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(fs::File::open(path).unwrap()).unwrap();
    let mut frames = Vec::new();
    while let Some(frame) = decoder.read_next_frame().unwrap() {
        frames.push((frame.delay, frame.buffer.to_vec()));
    }
    DecodedGif {
        width: decoder.width(),
        height: decoder.height(),
        repeat: netscape_repeat(&fs::read(path).unwrap()),
        frames,
    }
}
