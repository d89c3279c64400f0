//! Admin menu model
//!
//! Describes the admin pages the host renders, the capability each
//! requires, their help tabs, and the assets loaded on them. Rendering
//! itself is done by the host from the returned template name.

use serde::Serialize;

use crate::auth::{Capability, Session};
use crate::error::AppError;

const ASSET_VERSION: &str = "1.0.0";

/// Where a page is listed in the host menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuParent {
    /// Under the settings menu
    Options,
    /// Under the users menu
    Users,
    /// Reachable by slug only
    Hidden,
}

/// Contextual help attached to a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HelpTab {
    pub id: &'static str,
    pub title: &'static str,
    pub template: &'static str,
}

/// One admin page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminPage {
    pub slug: &'static str,
    pub page_title: &'static str,
    pub menu_title: &'static str,
    pub parent: MenuParent,
    pub capability: Capability,
    pub template: &'static str,
    pub help_tabs: Vec<HelpTab>,
}

/// Kind of admin asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Style,
    Script,
}

/// A stylesheet or script the host should enqueue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminAsset {
    pub kind: AssetKind,
    pub handle: &'static str,
    pub path: &'static str,
    pub version: &'static str,
    pub dependencies: Vec<&'static str>,
}

fn settings_help() -> HelpTab {
    HelpTab {
        id: "activitypub-help",
        title: "Help",
        template: "help",
    }
}

/// The admin pages of the plugin
#[derive(Debug, Clone)]
pub struct AdminMenu {
    pages: Vec<AdminPage>,
}

impl AdminMenu {
    pub fn activitypub() -> Self {
        Self {
            pages: vec![
                AdminPage {
                    slug: "activitypub",
                    page_title: "Welcome",
                    menu_title: "ActivityPub",
                    parent: MenuParent::Options,
                    capability: Capability::ManageOptions,
                    template: "welcome",
                    help_tabs: vec![settings_help()],
                },
                AdminPage {
                    slug: "activitypub-settings",
                    page_title: "ActivityPub Settings",
                    menu_title: "ActivityPub",
                    parent: MenuParent::Hidden,
                    capability: Capability::ManageOptions,
                    template: "settings",
                    help_tabs: vec![settings_help()],
                },
                AdminPage {
                    slug: "activitypub-followers-list",
                    page_title: "Followers",
                    menu_title: "Followers (Fediverse)",
                    parent: MenuParent::Users,
                    capability: Capability::Read,
                    template: "followers-list",
                    help_tabs: Vec::new(),
                },
            ],
        }
    }

    /// Menu entries the user can see
    ///
    /// Hidden pages are never listed.
    pub fn visible_to(&self, session: &Session) -> Vec<&AdminPage> {
        self.pages
            .iter()
            .filter(|page| page.parent != MenuParent::Hidden)
            .filter(|page| session.has_capability(page.capability))
            .collect()
    }

    /// Resolve a page for rendering
    ///
    /// # Errors
    /// `NotFound` for an unknown slug, `Forbidden` if the user lacks the
    /// page's capability
    pub fn page(&self, slug: &str, session: &Session) -> Result<&AdminPage, AppError> {
        let page = self
            .pages
            .iter()
            .find(|page| page.slug == slug)
            .ok_or(AppError::NotFound)?;
        session.require(page.capability)?;
        Ok(page)
    }
}

/// Assets to load for an admin screen
///
/// Only screens belonging to the plugin get the stylesheet and script.
pub fn assets_for(hook_suffix: &str) -> Vec<AdminAsset> {
    if !hook_suffix.contains("activitypub") {
        return Vec::new();
    }

    vec![
        AdminAsset {
            kind: AssetKind::Style,
            handle: "activitypub-admin-styles",
            path: "assets/css/activitypub-admin.css",
            version: ASSET_VERSION,
            dependencies: Vec::new(),
        },
        AdminAsset {
            kind: AssetKind::Script,
            handle: "activitypub-admin-script",
            path: "assets/js/activitypub-admin.js",
            version: ASSET_VERSION,
            dependencies: vec!["jquery"],
        },
    ]
}
