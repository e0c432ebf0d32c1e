//! Startup banner.

use std::path::Path;

use crate::consts::{AUTHOR, HOMEPAGE, REPO};

/// Server configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub port: u16,
    pub api_base: &'a str,
    pub has_credential: bool,
    pub public_dir: &'a Path,
}

/// Render the banner text.
pub fn render_banner(info: &BannerInfo) -> String {
    let credential = if info.has_credential {
        "bearer token ✓"
    } else {
        "not configured (demo mode only)"
    };

    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║              C L O U T                ║
   ║     what your audience is worth       ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   server    http://localhost:{}
   endpoint  http://localhost:{}/api/analyze/:username
   provider  {}
   auth      {}
   static    {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.port,
        info.port,
        info.api_base,
        credential,
        info.public_dir.display(),
    )
}

/// Print the startup banner.
pub fn print_banner(info: &BannerInfo) {
    println!("{}", render_banner(info));
}
