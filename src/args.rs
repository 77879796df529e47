use clap::Parser;

/// Local development file server
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct ServerArgs {

    /// The directory served as the server root
    #[clap(short, long, default_value = ".")]
    pub root: String,

    /// The server host
    #[clap(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Base name of the config file, read as <name>.txt in the root
    #[clap(long, default_value = "Config")]
    pub config: String,

    /// Base name of the MIME table file, read as <name>.txt in the root
    #[clap(long, default_value = "Mime")]
    pub mime: String,
}
