use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::grayscale::types::SourcePage;

pub trait TiffPageReader {
    fn page_count(&self, data: &[u8]) -> Result<usize>;

    /// Decodes pages in file order, handing each to `visit` before the next
    /// one is read. Stops at the first error from either side.
    fn read_pages(
        &self,
        data: &[u8],
        visit: &mut dyn FnMut(SourcePage) -> Result<()>,
    ) -> Result<()>;
}
