use crate::analysis::{ComparisonResult, CompressionAnalysis, TagSizeAnalysis};
use crate::api::BatchSummary;
use crate::extraction::tags::tag_key;
use crate::types::TagCategory;
use std::fmt;

/// Largest tags listed per category
const TOP_TAGS: usize = 5;

/// Text report of a compression analysis
pub struct CompressionReport<'a> {
    analysis: &'a CompressionAnalysis,
}

impl<'a> CompressionReport<'a> {
    pub fn new(analysis: &'a CompressionAnalysis) -> Self {
        Self { analysis }
    }
}

impl<'a> fmt::Display for CompressionReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        writeln!(f, "Compression Analysis")?;
        writeln!(f, "====================")?;
        writeln!(f)?;
        writeln!(f, "File:              {}", a.file_path.display())?;
        writeln!(f, "File Size:         {} bytes", a.file_size)?;
        writeln!(f, "Transfer Syntax:   {}", a.compression_type)?;
        writeln!(f, "Transfer UID:      {}", a.transfer_syntax_uid)?;
        writeln!(f, "Compressed:        {}", a.is_compressed)?;
        writeln!(
            f,
            "Dimensions:        {} x {} x {} frame(s)",
            a.image.rows, a.image.columns, a.image.number_of_frames
        )?;
        writeln!(f, "Bits Allocated:    {}", a.image.bits_allocated)?;
        writeln!(f, "Samples/Pixel:     {}", a.image.samples_per_pixel)?;
        writeln!(
            f,
            "Uncompressed Size: {} bytes",
            a.theoretical_uncompressed_size
        )?;
        writeln!(f, "Pixel Data Size:   {} bytes", a.compressed_pixel_size)?;
        writeln!(f, "Ratio:             {:.2}:1", a.compression_ratio)?;
        Ok(())
    }
}

/// Text report of a tag size analysis
pub struct TagSizeReport<'a> {
    analysis: &'a TagSizeAnalysis,
}

impl<'a> TagSizeReport<'a> {
    pub fn new(analysis: &'a TagSizeAnalysis) -> Self {
        Self { analysis }
    }
}

impl<'a> fmt::Display for TagSizeReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let a = self.analysis;
        writeln!(f, "Tag Size Analysis")?;
        writeln!(f, "=================")?;
        writeln!(f)?;
        writeln!(f, "File Size:  {} bytes", a.file_size)?;
        writeln!(f)?;

        for category in TagCategory::ALL {
            let tags = a.categories.get(&category).map(Vec::as_slice).unwrap_or_default();
            writeln!(
                f,
                "{:<12} {:>12} bytes {:>6.2}%  ({} tags)",
                category.simple_name(),
                a.category_total(category),
                a.category_percent(category),
                tags.len()
            )?;
            for tag in tags.iter().take(TOP_TAGS) {
                let name = if tag.name.is_empty() { "-" } else { tag.name.as_str() };
                writeln!(f, "    {} {:<32} {:>12} bytes", tag.tag, name, tag.size)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Overhead:   {} bytes", a.overhead)?;
        Ok(())
    }
}

/// Text report of a round-trip comparison
pub struct ComparisonReport<'a> {
    result: &'a ComparisonResult,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(result: &'a ComparisonResult) -> Self {
        Self { result }
    }
}

impl<'a> fmt::Display for ComparisonReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.result;
        writeln!(f, "Comparison")?;
        writeln!(f, "==========")?;
        writeln!(f)?;
        writeln!(
            f,
            "Original:     {} ({} bytes)",
            r.original_file.display(),
            r.original_size
        )?;
        writeln!(
            f,
            "Recombined:   {} ({} bytes)",
            r.recombined_file.display(),
            r.recombined_size
        )?;

        if let Some(error) = &r.error {
            writeln!(f, "Error:        {}", error)?;
            return Ok(());
        }

        writeln!(f, "Identical:    {}", r.is_identical)?;
        let pixels = if r.pixel_data_identical {
            "identical"
        } else {
            "different"
        };
        writeln!(f, "Pixel Data:   {}", pixels)?;

        if !r.missing_tags.is_empty() {
            let tags: Vec<_> = r.missing_tags.iter().map(|t| tag_key(*t)).collect();
            writeln!(f, "Missing Tags: {}", tags.join(", "))?;
        }
        if !r.extra_tags.is_empty() {
            let tags: Vec<_> = r.extra_tags.iter().map(|t| tag_key(*t)).collect();
            writeln!(f, "Extra Tags:   {}", tags.join(", "))?;
        }
        for difference in &r.meta_differences {
            writeln!(f, "  meta  {}", difference)?;
        }
        for difference in &r.data_differences {
            writeln!(f, "  data  {}", difference)?;
        }
        Ok(())
    }
}

/// One-screen summary of a folder run
pub struct BatchReport<'a> {
    summary: &'a BatchSummary,
}

impl<'a> BatchReport<'a> {
    pub fn new(summary: &'a BatchSummary) -> Self {
        Self { summary }
    }
}

impl<'a> fmt::Display for BatchReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        writeln!(f, "Files:      {}", s.total())?;
        writeln!(f, "Succeeded:  {}", s.succeeded.len())?;
        writeln!(f, "Failed:     {}", s.failed.len())?;
        if !s.comparisons.is_empty() {
            writeln!(f, "Identical:  {}/{}", s.identical_count(), s.comparisons.len())?;
        }
        for failed in &s.failed {
            writeln!(f, "  {}: {}", failed.path.display(), failed.reason)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{TagSize, ValueDifference};
    use crate::api::FailedFile;
    use crate::model::ImageInfo;
    use dicom_core::Tag;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    #[test]
    fn test_compression_report_format() {
        let analysis = CompressionAnalysis {
            file_path: PathBuf::from("ct.dcm"),
            file_size: 525_000,
            transfer_syntax_uid: "1.2.840.10008.1.2.1".to_string(),
            compression_type: "Explicit VR Little Endian (Uncompressed)".to_string(),
            is_compressed: false,
            image: ImageInfo {
                rows: 512,
                columns: 512,
                samples_per_pixel: 1,
                bits_allocated: 16,
                number_of_frames: 1,
            },
            theoretical_uncompressed_size: 524_288,
            compressed_pixel_size: 524_288,
            compression_ratio: 1.0,
        };

        let output = format!("{}", CompressionReport::new(&analysis));
        assert!(output.contains("Compression Analysis"));
        assert!(output.contains("Dimensions:        512 x 512 x 1 frame(s)"));
        assert!(output.contains("Uncompressed Size: 524288 bytes"));
        assert!(output.contains("Ratio:             1.00:1"));
    }

    #[test]
    fn test_tag_size_report_format() {
        let mut categories = BTreeMap::new();
        categories.insert(
            TagCategory::PixelData,
            vec![TagSize {
                tag: "(7FE0,0010)".to_string(),
                name: "PixelData".to_string(),
                size: 600,
            }],
        );
        categories.insert(
            TagCategory::Private,
            vec![TagSize {
                tag: "(0029,1010)".to_string(),
                name: String::new(),
                size: 268,
            }],
        );
        let analysis = TagSizeAnalysis {
            file_path: PathBuf::from("ct.dcm"),
            file_size: 1000,
            categories,
            total_tag_size: 868,
            overhead: 132,
        };

        let output = format!("{}", TagSizeReport::new(&analysis));
        assert!(output.contains("Pixel Data            600 bytes  60.00%  (1 tags)"));
        assert!(output.contains("(0029,1010) -"));
        assert!(output.contains("Standard                0 bytes   0.00%  (0 tags)"));
        assert!(output.contains("Overhead:   132 bytes"));
    }

    #[test]
    fn test_comparison_report_format() {
        let result = ComparisonResult {
            original_file: PathBuf::from("a.dcm"),
            recombined_file: PathBuf::from("a_recombined.dcm"),
            missing_tags: vec![Tag(0x0029, 0x1010)],
            value_differences: vec![ValueDifference {
                path: "(0018,0050)".to_string(),
                tag: Tag(0x0018, 0x0050),
                original: "70".to_string(),
                recombined: "70.0".to_string(),
            }],
            data_differences: vec!["(0018,0050): '70' != '70.0'".to_string()],
            pixel_data_identical: true,
            ..ComparisonResult::default()
        };

        let output = format!("{}", ComparisonReport::new(&result));
        assert!(output.contains("Identical:    false"));
        assert!(output.contains("Pixel Data:   identical"));
        assert!(output.contains("Missing Tags: (0029,1010)"));
        assert!(output.contains("  data  (0018,0050): '70' != '70.0'"));

        let failed = ComparisonResult {
            error: Some("cannot open".to_string()),
            ..ComparisonResult::default()
        };
        let output = format!("{}", ComparisonReport::new(&failed));
        assert!(output.contains("Error:        cannot open"));
        assert!(!output.contains("Identical"));
    }

    #[test]
    fn test_batch_report_format() {
        let summary = BatchSummary {
            succeeded: vec![PathBuf::from("a.dcm")],
            failed: vec![FailedFile {
                path: PathBuf::from("b.dcm"),
                reason: "not DICOM".to_string(),
            }],
            comparisons: Vec::new(),
        };
        let output = format!("{}", BatchReport::new(&summary));
        assert!(output.contains("Files:      2"));
        assert!(output.contains("Failed:     1"));
        assert!(output.contains("  b.dcm: not DICOM"));
        assert!(!output.contains("Identical"));
    }
}
