use image::DynamicImage;

/// Frequently used structs shared by the ingestion front-ends and the dataset.

/// Transform applied independently to each modality when a record is fetched.
pub type Transform = Box<dyn Fn(&DynamicImage) -> DynamicImage>;

/// A paired sample as emitted by an ingestion front-end, before label encoding.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub rgb: DynamicImage,
    pub depth: DynamicImage,
    pub class_label: String,
}

/// A paired RGB-depth sample with its class label and dense integer code.
#[derive(Debug, Clone)]
pub struct Record {
    pub rgb: DynamicImage,
    pub depth: DynamicImage,
    pub class_label: String,
    pub encoded_class: usize,
}
