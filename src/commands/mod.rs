pub mod config;
pub mod inspect;
pub mod reveal;
pub mod scan;

use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::host::PageHost;
use crate::page::PageCapture;

/// Load a page capture and stage it in a fresh host. The companion is
/// injected on the first request.
pub(crate) fn open_host(page: &Path) -> Result<(PageHost, String)> {
    let config = Config::load()?;
    let capture = PageCapture::from_file(page)?;
    let doc = capture.to_document()?;
    let page_id = page.display().to_string();

    let mut host = PageHost::new(config.host_options());
    host.open_page(&page_id, doc);
    Ok((host, page_id))
}
