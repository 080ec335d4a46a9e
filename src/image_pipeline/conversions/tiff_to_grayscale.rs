use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tiff::encoder::TiffEncoder;
use tracing::{info, instrument, warn};

use crate::image_pipeline::{
    common::error::{ConversionError, Result},
    conversions::report::{ConversionReport, PageReport, PipelineTimings, Timer},
    grayscale::{
        metadata::scaled_dimensions, remap, GrayscalePage, GrayscalePalette, PageMetadata,
        SourcePage,
    },
    tiff::{ConversionConfig, StandardTiffReader, StandardTiffWriter, TiffPageReader, TiffWriter},
};

pub struct TiffGrayscalePipeline<R: TiffPageReader, W: TiffWriter> {
    reader: R,
    writer: W,
    config: ConversionConfig,
    palette: GrayscalePalette,
}

impl TiffGrayscalePipeline<StandardTiffReader, StandardTiffWriter> {
    pub fn new(config: ConversionConfig) -> Result<Self> {
        Self::with_custom(StandardTiffReader, StandardTiffWriter, config)
    }
}

impl<R: TiffPageReader, W: TiffWriter> TiffGrayscalePipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ConversionConfig) -> Result<Self> {
        config.validate()?;
        let palette = GrayscalePalette::new(config.gray_levels)?;

        Ok(Self {
            reader,
            writer,
            config,
            palette,
        })
    }

    fn validate_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if !self.config.validate_dimensions {
            return Ok(());
        }

        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        Ok(())
    }

    /// Converts every page of `input_data` and appends it to `output`, in
    /// source order.
    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert<O: Write + Seek>(
        &self,
        input_data: &[u8],
        output: &mut O,
    ) -> Result<ConversionReport> {
        info!("Starting TIFF to grayscale conversion");

        let mut report = ConversionReport::default();

        let page_count = {
            let _span = tracing::info_span!("count_pages").entered();
            let timer = Timer::start("count_pages");
            let count = self.reader.page_count(input_data)?;
            timer.stop(&mut report.timings);
            count
        };
        info!("Number of images: {}", page_count);

        {
            let mut encoder = TiffEncoder::new(&mut *output)
                .map_err(|e| ConversionError::EncodeError(e.to_string()))?
                .with_compression(self.config.compression.into());

            // The reader decodes between visits, so each lap covers one page.
            let mut decode = Timer::start("decode");
            self.reader.read_pages(input_data, &mut |page| {
                decode.lap(&mut report.timings);
                let page_report = self.convert_page(page, &mut encoder, &mut report.timings)?;
                report.pages.push(page_report);
                decode.restart();
                Ok(())
            })?;
        }
        output.flush()?;

        info!(
            pages = report.page_count(),
            elapsed_ms = report.timings.total_duration().as_secs_f64() * 1000.0,
            "Conversion complete"
        );
        Ok(report)
    }

    fn convert_page<E: Write + Seek>(
        &self,
        page: SourcePage,
        encoder: &mut TiffEncoder<E>,
        timings: &mut PipelineTimings,
    ) -> Result<PageReport> {
        let SourcePage { index, image, tags } = page;
        let _span = tracing::info_span!("page", index).entered();
        info!("Index: {}", index);

        let source_dimensions = (image.width(), image.height());
        self.validate_dimensions(source_dimensions.0, source_dimensions.1)?;

        let timer = Timer::start("metadata");
        let (mut metadata, metadata_fallback) =
            match tags.and_then(|tags| PageMetadata::from_tags(&tags)) {
                Ok(metadata) => (metadata, false),
                Err(e) => {
                    warn!("Page {}: {}; using default resolution and timestamp", index, e);
                    (PageMetadata::default(), true)
                }
            };
        timer.stop(timings);

        let target_dpi = self.config.target_dpi;
        let (image, rescaled) = match metadata.scale_factor(target_dpi) {
            Some(factor) => {
                let timer = Timer::start("rescale");
                let (width, height) =
                    scaled_dimensions(source_dimensions.0, source_dimensions.1, factor)?;
                let scaled = remap::resample(&image, width, height, self.config.resample_filter);
                metadata.apply_scale(target_dpi, factor);
                timer.stop(timings);
                (scaled, true)
            }
            None => (image, false),
        };

        let timer = Timer::start("remap");
        let raster = remap::remap_to_palette(&image, &self.palette);
        timer.stop(timings);

        let output_dimensions = (raster.width, raster.height);
        let page = GrayscalePage {
            index,
            raster,
            metadata,
            palette: &self.palette,
        };

        let timer = Timer::start("encode");
        self.writer.write_page(encoder, &page)?;
        timer.stop(timings);

        Ok(PageReport {
            index,
            source_dimensions,
            output_dimensions,
            metadata_fallback,
            rescaled,
        })
    }

    /// Converts `input_path` into `output_path`.
    ///
    /// The output is staged next to its destination and only renamed into
    /// place once every page has been written, so a failed run leaves any
    /// existing file untouched.
    #[instrument(skip(self, input_path, output_path))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<ConversionReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            std::fs::read(input_path).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let directory = output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let staging = {
            let _span = tracing::info_span!("create_output_file").entered();
            NamedTempFile::new_in(directory).map_err(|e| {
                ConversionError::OutputWriteError(format!("{}: {}", directory.display(), e))
            })?
        };

        let report = {
            let mut output = BufWriter::new(staging.as_file());
            self.convert(&input_data, &mut output)?
        };

        staging.persist(output_path).map_err(|e| {
            ConversionError::OutputWriteError(format!("{}: {}", output_path.display(), e.error))
        })?;

        Ok(report)
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn palette(&self) -> &GrayscalePalette {
        &self.palette
    }
}
