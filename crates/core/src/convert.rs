use std::borrow::Cow;

use fontverter_sfnt::{DecodedFont, SfntImage};
use log::{debug, info};

use crate::{ContainerFormat, ConvertOptions, Error, Result, detect_format};

/// Runs conversions with a fixed set of codec options.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Convert `data` to `to`, detecting the source format unless `from` is given.
    ///
    /// When source and target are the same the input slice is returned
    /// untouched, without being parsed.
    pub fn convert<'a>(
        &self,
        data: &'a [u8],
        to: ContainerFormat,
        from: Option<ContainerFormat>,
    ) -> Result<Cow<'a, [u8]>> {
        if self.options.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let from = match from {
            Some(from) => from,
            None => detect_format(data)?,
        };
        if from == to {
            debug!("Source and target are both {to}, returning input as is");
            return Ok(Cow::Borrowed(data));
        }

        let font = self.decode(data, from)?;
        debug!("Decoded {from}: {} tables, flavor '{}'", font.image.len(), font.image.flavor());
        let output = self.encode(&font, to)?;
        info!("Converted {from} ({} bytes) to {to} ({} bytes)", data.len(), output.len());
        Ok(Cow::Owned(output))
    }

    /// Unpack a container of the given format.
    pub fn decode(&self, data: &[u8], format: ContainerFormat) -> Result<DecodedFont> {
        match format {
            ContainerFormat::Sfnt => SfntImage::from_bytes_with_cancel(data, self.options.cancel.as_ref())
                .map(DecodedFont::new)
                .map_err(Error::sfnt),
            ContainerFormat::Woff => fontverter_font_woff::decode(data, &self.options.woff()).map_err(Error::woff),
            ContainerFormat::Woff2 => {
                fontverter_font_woff2::decode(data, &self.options.woff2()).map_err(Error::woff2)
            }
        }
    }

    /// Pack decoded tables into the given format.
    pub fn encode(&self, font: &DecodedFont, format: ContainerFormat) -> Result<Vec<u8>> {
        match format {
            ContainerFormat::Sfnt => {
                if !font.extras.is_empty() {
                    debug!("Dropping web font metadata and private data: SFNT has no place for them");
                }
                Ok(font.image.to_bytes())
            }
            ContainerFormat::Woff => fontverter_font_woff::encode(font, &self.options.woff()).map_err(Error::woff),
            ContainerFormat::Woff2 => {
                fontverter_font_woff2::encode(font, &self.options.woff2()).map_err(Error::woff2)
            }
        }
    }
}

/// Convert `data` to the format named `to`.
///
/// Names are `sfnt` (or `truetype`), `woff` and `woff2`. The target is
/// validated first, then the source if one is given; without a source the
/// format is detected from the data.
///
/// ```no_run
/// let ttf = std::fs::read("input.ttf").unwrap();
/// let woff2 = fontverter_core::convert(&ttf, "woff2", None).unwrap();
/// std::fs::write("output.woff2", &woff2).unwrap();
/// ```
pub fn convert<'a>(data: &'a [u8], to: &str, from: Option<&str>) -> Result<Cow<'a, [u8]>> {
    let to = ContainerFormat::parse_target(to)?;
    let from = from.map(ContainerFormat::parse_source).transpose()?;
    Converter::default().convert(data, to, from)
}

/// Convert with explicit codec options.
pub fn convert_with<'a>(
    data: &'a [u8],
    to: ContainerFormat,
    from: Option<ContainerFormat>,
    options: &ConvertOptions,
) -> Result<Cow<'a, [u8]>> {
    Converter::new(options.clone()).convert(data, to, from)
}
