use std::time::Duration;

use crate::strategy::SelectorChain;
use crate::wait::Poll;
use crate::Selector;

/// Package of the system photo picker some builds hand media selection to.
pub const PHOTO_PICKER_PACKAGE: &str = "com.google.android.providers.media.module";

/// Class-name pattern covering the editors the composer has shipped with.
pub const TEXT_INPUT_CLASS_PATTERN: &str = ".*EditText|.*TextInput.*|.*MultiAutoCompleteTextView.*";

/// The social app being posted to, and the controls the flow touches.
#[derive(Debug, Clone)]
pub struct TargetApp {
    pub package: String,
    pub compose_button_id: String,
    pub text_field_id: String,
    pub submit_button_id: String,
    pub media_button_ids: Vec<String>,
    pub album_switch_ids: Vec<String>,
    pub recent_album_labels: Vec<String>,
    pub gallery_tile_ids: Vec<String>,
}

impl Default for TargetApp {
    fn default() -> Self {
        let id = |name: &str| format!("com.twitter.android:id/{name}");
        Self {
            package: "com.twitter.android".to_string(),
            compose_button_id: id("composer_write"),
            text_field_id: id("tweet_text"),
            submit_button_id: id("button_tweet"),
            media_button_ids: vec![id("gallery"), id("composer_media"), id("photo_button")],
            album_switch_ids: vec![id("gallery_header_spinner"), id("media_picker_album_spinner")],
            recent_album_labels: vec!["Download".to_string(), "Recents".to_string()],
            gallery_tile_ids: vec![
                id("media_image"),
                id("gallery_image"),
                format!("{PHOTO_PICKER_PACKAGE}:id/icon_thumbnail"),
            ],
        }
    }
}

impl TargetApp {
    pub fn compose_button(&self) -> Selector {
        Selector::resource_id(&self.compose_button_id)
    }

    pub fn submit_button(&self) -> Selector {
        Selector::resource_id(&self.submit_button_id)
    }

    /// Any text editor, for readiness probing.
    pub fn any_text_input(&self) -> Selector {
        Selector::class_name_matches(TEXT_INPUT_CLASS_PATTERN)
    }

    /// Where to type the post, most specific first. The generic first-input
    /// fallback is only offered once an editor has been seen on screen.
    pub fn compose_field_chain(&self, input_seen: bool) -> SelectorChain {
        let mut chain = SelectorChain::new(
            "compose text field",
            vec![
                Selector::resource_id(&self.text_field_id),
                Selector::class_name("android.widget.EditText"),
            ],
        );
        if input_seen {
            chain.push(self.any_text_input().instance(0));
        }
        chain
    }

    pub fn media_button_chain(&self) -> SelectorChain {
        let mut chain =
            SelectorChain::from_resource_ids("media picker button", self.media_button_ids.as_slice());
        chain.push(Selector::description_contains("Photos").in_package(&self.package));
        chain
    }

    pub fn album_switch_chain(&self) -> SelectorChain {
        SelectorChain::from_resource_ids("album switcher", self.album_switch_ids.as_slice())
    }

    pub fn recent_album_chain(&self) -> SelectorChain {
        SelectorChain::from_labels("recent downloads album", self.recent_album_labels.as_slice())
    }

    /// Picker tiles only. A bare image inside the app itself (an avatar, a
    /// banner) must never count as a tile.
    pub fn gallery_tile_chain(&self) -> SelectorChain {
        let mut chain =
            SelectorChain::from_resource_ids("gallery image tile", self.gallery_tile_ids.as_slice());
        chain.push(Selector::class_name("android.widget.ImageView").in_package(PHOTO_PICKER_PACKAGE));
        chain
    }
}

/// The browser used to pull an image onto the device.
#[derive(Debug, Clone)]
pub struct BrowserApp {
    pub package: String,
    pub save_menu_labels: Vec<String>,
    pub permission_labels: Vec<String>,
}

impl Default for BrowserApp {
    fn default() -> Self {
        Self {
            package: "com.android.chrome".to_string(),
            save_menu_labels: ["Download image", "Save image", "Download", "Save"]
                .map(String::from)
                .to_vec(),
            permission_labels: ["Allow", "ALLOW", "While using the app"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl BrowserApp {
    pub fn web_content_chain(&self) -> SelectorChain {
        SelectorChain::new(
            "web content",
            vec![
                Selector::class_name("android.webkit.WebView"),
                Selector::resource_id(format!("{}:id/compositor_view_holder", self.package)),
            ],
        )
    }

    pub fn save_menu_chain(&self) -> SelectorChain {
        SelectorChain::from_labels("save image menu item", self.save_menu_labels.as_slice())
    }

    pub fn permission_chain(&self) -> SelectorChain {
        let mut chain = SelectorChain::new(
            "permission prompt",
            vec![Selector::resource_id(
                "com.android.permissioncontroller:id/permission_allow_button",
            )],
        );
        for label in &self.permission_labels {
            chain.push(Selector::text(label));
        }
        chain
    }
}

/// Every wait the flow performs. Ceilings are upper bounds; waits end as soon
/// as their condition holds.
#[derive(Debug, Clone)]
pub struct PublishTimings {
    /// Pause after force-stopping the app.
    pub after_stop: Duration,
    pub foreground: Poll,
    /// How long a second compose tap may take to become possible.
    pub compose_second_tap: Poll,
    pub input_ready: Poll,
    pub control: Poll,
    /// Pause after submitting, the app sends in the background.
    pub after_submit: Duration,
    pub page_load: Poll,
    pub long_press: Duration,
    pub context_menu: Poll,
    pub permission_prompt: Poll,
    /// Pause for the download to land in media storage.
    pub after_download: Duration,
    pub picker: Poll,
}

impl Default for PublishTimings {
    fn default() -> Self {
        let ms = Duration::from_millis;
        let secs = Duration::from_secs;
        Self {
            after_stop: secs(1),
            foreground: Poll::new(secs(10), ms(500)),
            compose_second_tap: Poll::new(secs(3), ms(250)),
            input_ready: Poll::new(secs(5), ms(500)),
            control: Poll::new(secs(5), ms(500)),
            after_submit: secs(2),
            page_load: Poll::new(secs(10), ms(500)),
            long_press: secs(1),
            context_menu: Poll::new(secs(5), ms(250)),
            permission_prompt: Poll::new(secs(2), ms(250)),
            after_download: secs(3),
            picker: Poll::new(secs(5), ms(500)),
        }
    }
}

impl PublishTimings {
    /// No waiting at all: every poll checks once, every pause is skipped.
    pub fn immediate() -> Self {
        Self {
            after_stop: Duration::ZERO,
            foreground: Poll::once(),
            compose_second_tap: Poll::once(),
            input_ready: Poll::once(),
            control: Poll::once(),
            after_submit: Duration::ZERO,
            page_load: Poll::once(),
            long_press: Duration::ZERO,
            context_menu: Poll::once(),
            permission_prompt: Poll::once(),
            after_download: Duration::ZERO,
            picker: Poll::once(),
        }
    }
}
