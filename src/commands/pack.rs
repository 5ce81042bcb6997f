use std::env;

use fs_err as fs;
use indicatif::{ProgressBar, ProgressStyle};
use maxpack::PackStatus;

use crate::{
    atlas::AtlasSession,
    options::{GlobalOptions, PackOptions},
};

pub fn pack(global: GlobalOptions, options: PackOptions) -> anyhow::Result<()> {
    let fuzzy_config_path = match options.config_path {
        Some(path) => path,
        None => env::current_dir()?,
    };

    let mut session = AtlasSession::new(&fuzzy_config_path)?;
    session.load_sprites()?;

    let output = session.layout()?;

    let output_folder = match options.output {
        Some(folder) => folder,
        None => session.config().output_folder(),
    };
    fs::create_dir_all(&output_folder)?;

    let progress = if global.quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(0);
        bar.set_style(ProgressStyle::default_bar().template("{msg} [{bar:40}] {pos}/{len}"));
        bar.set_message("Drawing sprites");
        bar
    };

    let pages = session.compose(&output, &progress);
    session.write_pages(&output_folder, &pages)?;
    session.manifest(&output).write_to_folder(&output_folder)?;

    match output.status() {
        PackStatus::Done => log::info!(
            "Wrote {} pages to {}",
            pages.len(),
            output_folder.display()
        ),
        PackStatus::Incomplete { missing } => log::warn!(
            "Wrote {} pages to {}, {} sprites did not fit",
            pages.len(),
            output_folder.display(),
            missing
        ),
    }

    Ok(())
}
