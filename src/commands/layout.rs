use std::{
    env,
    io::{self, Write},
};

use crate::{
    atlas::AtlasSession,
    options::{GlobalOptions, LayoutOptions},
};

pub fn layout(_global: GlobalOptions, options: LayoutOptions) -> anyhow::Result<()> {
    let fuzzy_config_path = match options.config_path {
        Some(path) => path,
        None => env::current_dir()?,
    };

    let mut session = AtlasSession::new(&fuzzy_config_path)?;
    session.load_sprites()?;

    let output = session.layout()?;
    let manifest = session.manifest(&output);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, &manifest)?;
    writeln!(handle)?;

    Ok(())
}
