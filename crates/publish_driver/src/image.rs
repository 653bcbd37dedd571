//! Getting an image into the post: download it on the device through the
//! browser, then pick it from the app's media picker.
//!
//! Everything here is best-effort except the final tile pick, which fails the
//! publish when no tile can be found.

use pipeline_logging::{pipeline_debug, pipeline_info, pipeline_warn};

use crate::apps::{BrowserApp, PublishTimings, TargetApp};
use crate::strategy::SelectorChain;
use crate::wait::{poll_for, settle};
use crate::{Device, DeviceError, DriverError, ElementInfo};

/// The top-most tile, left-most among equals. Zero-sized tiles are ignored.
pub fn pick_top_left(tiles: &[ElementInfo]) -> Option<&ElementInfo> {
    tiles
        .iter()
        .filter(|tile| !tile.bounds.is_empty())
        .min_by_key(|tile| (tile.bounds.top, tile.bounds.left))
}

/// Open `image_url` in the browser and save it via the long-press menu.
pub async fn save_image_via_browser<D>(
    device: &D,
    browser: &BrowserApp,
    timings: &PublishTimings,
    image_url: &str,
) -> Result<(), DriverError>
where
    D: Device + ?Sized,
{
    pipeline_info!("Opening {} in {}", image_url, browser.package);
    device.open_url(image_url, &browser.package).await?;

    let (x, y) = press_point(device, &browser.web_content_chain(), timings).await?;
    pipeline_debug!("long-pressing image at ({}, {})", x, y);
    device.long_click_at(x, y, timings.long_press).await?;

    match browser
        .save_menu_chain()
        .wait_for(device, timings.context_menu)
        .await?
    {
        Some(item) => {
            device.click(item).await?;
        }
        None => pipeline_warn!("No save entry in the browser context menu, continuing"),
    }

    if let Some(allow) = browser
        .permission_chain()
        .wait_for(device, timings.permission_prompt)
        .await?
    {
        pipeline_info!("Granting storage permission");
        device.click(allow).await?;
    }

    settle(timings.after_download).await;
    Ok(())
}

/// Centre of the rendered page, or of the screen when the page element
/// cannot be found.
async fn press_point<D>(
    device: &D,
    web_content: &SelectorChain,
    timings: &PublishTimings,
) -> Result<(i32, i32), DeviceError>
where
    D: Device + ?Sized,
{
    if let Some(selector) = web_content.wait_for(device, timings.page_load).await? {
        if let Some(info) = device.element_info(selector).await? {
            if !info.bounds.is_empty() {
                return Ok(info.bounds.center());
            }
        }
    }
    let (width, height) = device.window_size().await?;
    pipeline_warn!("Web content not located, pressing screen centre");
    Ok(((width / 2) as i32, (height / 2) as i32))
}

/// From an open composer: open the media picker, steer it toward recent
/// downloads, and tap the newest-looking tile.
pub async fn attach_from_gallery<D>(
    device: &D,
    app: &TargetApp,
    timings: &PublishTimings,
) -> Result<(), DriverError>
where
    D: Device + ?Sized,
{
    match app.media_button_chain().wait_for(device, timings.control).await? {
        Some(button) => {
            device.click(button).await?;
        }
        None => pipeline_warn!("Media picker button not found, looking for tiles anyway"),
    }

    if let Some(switch) = app.album_switch_chain().first_match(device).await? {
        device.click(switch).await?;
        match app.recent_album_chain().wait_for(device, timings.control).await? {
            Some(album) => {
                device.click(album).await?;
            }
            None => pipeline_debug!("no recent-downloads album offered"),
        }
    }

    let tiles = app.gallery_tile_chain();
    let tiles = &tiles;
    let tile = poll_for(timings.picker, move || first_tile(device, tiles))
        .await?
        .ok_or_else(|| DriverError::not_found(tiles.element()))?;
    let (x, y) = tile.bounds.center();
    pipeline_info!("Selecting gallery tile at ({}, {})", x, y);
    device.click_at(x, y).await?;
    Ok(())
}

async fn first_tile<D>(device: &D, chain: &SelectorChain) -> Result<Option<ElementInfo>, DeviceError>
where
    D: Device + ?Sized,
{
    for candidate in chain.candidates() {
        let found = device.all_element_info(candidate).await?;
        if let Some(tile) = pick_top_left(&found) {
            pipeline_debug!("{} tiles for {}", found.len(), candidate);
            return Ok(Some(tile.clone()));
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Bounds;

    #[test]
    fn picks_top_most_then_left_most() {
        let tiles = vec![
            ElementInfo::at(Bounds::new(300, 200, 500, 400)),
            ElementInfo::at(Bounds::new(100, 200, 300, 400)),
            ElementInfo::at(Bounds::new(0, 400, 200, 600)),
        ];
        assert_eq!(pick_top_left(&tiles), Some(&tiles[1]));
    }

    #[test]
    fn empty_tiles_are_skipped() {
        let tiles = vec![
            ElementInfo::at(Bounds::new(0, 0, 0, 0)),
            ElementInfo::at(Bounds::new(0, 50, 100, 150)),
        ];
        assert_eq!(pick_top_left(&tiles), Some(&tiles[1]));
        assert_eq!(pick_top_left(&[]), None);
    }
}
