use std::path::PathBuf;

use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(about = "Packs sprites into texture atlases")]
pub struct Options {
    #[structopt(flatten)]
    pub global: GlobalOptions,

    #[structopt(subcommand)]
    pub command: Subcommand,
}

#[derive(Debug, StructOpt)]
pub struct GlobalOptions {
    /// Don't draw progress bars.
    #[structopt(long, global = true)]
    pub quiet: bool,
}

#[derive(Debug, StructOpt)]
pub enum Subcommand {
    /// Pack every input of an atlas project and write the resulting pages and
    /// an atlas.json manifest.
    Pack(PackOptions),

    /// Work out the layout of an atlas project and print its manifest to
    /// stdout, without writing any images.
    Layout(LayoutOptions),
}

#[derive(Debug, StructOpt)]
pub struct PackOptions {
    /// The atlaspack.toml file to use, or a folder containing one. Defaults
    /// to the current working directory.
    #[structopt(long = "config")]
    pub config_path: Option<PathBuf>,

    /// Where to put the atlas pages and manifest. Overrides the `output`
    /// field of the config.
    #[structopt(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, StructOpt)]
pub struct LayoutOptions {
    /// The atlaspack.toml file to use, or a folder containing one. Defaults
    /// to the current working directory.
    #[structopt(long = "config")]
    pub config_path: Option<PathBuf>,
}
