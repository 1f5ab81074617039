use anyhow::Context;
use clap::{Parser, Subcommand};
use mfstool_core::{FormatOptions, FsOptions, ImageDevice, MfsError, DEFAULT_DIRECT_ZONES};
use mfstool_filesystems::{MinixFormatter, MinixFs};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "mfstool")]
#[command(about = "Inspect and modify Minix filesystem images", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Limit how many zone slots are used as data pointers (1-9)
    #[arg(long, global = true, default_value_t = DEFAULT_DIRECT_ZONES)]
    direct_zones: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a directory (root by default)
    Ls {
        image: PathBuf,
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print a file's content
    Cat { image: PathBuf, path: String },
    /// Create an empty file
    Touch { image: PathBuf, path: String },
    /// Create a directory
    Mkdir { image: PathBuf, path: String },
    /// Append text to a file
    Append {
        image: PathBuf,
        path: String,
        text: String,
    },
    /// Show the inode behind a path
    Stat { image: PathBuf, path: String },
    /// Show superblock and layout information
    Info {
        image: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create a new empty image
    Format {
        image: PathBuf,
        /// Number of inodes
        #[arg(long, default_value_t = 128)]
        inodes: u16,
        /// Image size in 1 KiB blocks
        #[arg(long, default_value_t = 1024)]
        blocks: u16,
        /// Maximum name length (14 or 30)
        #[arg(long, default_value_t = 30)]
        name_len: usize,
    },
}

/// Prefix a library error with its kind so the message identifies it
fn with_kind<T>(result: Result<T, MfsError>) -> anyhow::Result<T> {
    result.map_err(|e| {
        let kind = e.kind();
        anyhow::Error::new(e).context(kind.to_string())
    })
}

fn open_session(image: &Path, options: FsOptions) -> anyhow::Result<MinixFs<File>> {
    let device = with_kind(ImageDevice::open(image, options.read_only))
        .with_context(|| format!("Failed to open image {}", image.display()))?;
    let file = with_kind(device.open_file())?;
    with_kind(MinixFs::open(file, options))
        .with_context(|| format!("{} is not a usable Minix image", image.display()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let read_only = FsOptions {
        read_only: true,
        direct_zones: cli.direct_zones,
    };
    let read_write = FsOptions {
        read_only: false,
        direct_zones: cli.direct_zones,
    };

    match cli.command {
        Commands::Ls { image, path } => {
            let mut fs = open_session(&image, read_only)?;
            let listing = with_kind(fs.list(&path))?;
            let mut stdout = std::io::stdout().lock();
            for name in listing.keys() {
                stdout.write_all(name)?;
                stdout.write_all(b"\n")?;
            }
        }
        Commands::Cat { image, path } => {
            let mut fs = open_session(&image, read_only)?;
            let content = with_kind(fs.read_file(&path))?;
            std::io::stdout().lock().write_all(&content)?;
        }
        Commands::Touch { image, path } => {
            let mut fs = open_session(&image, read_write)?;
            let inode = with_kind(fs.touch(&path))?;
            log::info!("Created file {} as inode {}", path, inode);
        }
        Commands::Mkdir { image, path } => {
            let mut fs = open_session(&image, read_write)?;
            let inode = with_kind(fs.mkdir(&path))?;
            log::info!("Created directory {} as inode {}", path, inode);
        }
        Commands::Append { image, path, text } => {
            let mut fs = open_session(&image, read_write)?;
            let inode = with_kind(fs.append(&path, text.as_bytes()))?;
            log::info!("{} is now {} bytes", path, inode.size);
        }
        Commands::Stat { image, path } => {
            let mut fs = open_session(&image, read_only)?;
            let inode_num = with_kind(fs.resolve_path(&path))?;
            let inode = with_kind(fs.read_inode(inode_num))?;
            println!("Inode: {}", inode_num);
            println!("  Type: {}", inode.kind_str());
            println!("  Mode: {:06o}", inode.mode);
            println!("  Size: {} bytes", inode.size);
            println!("  Links: {}", inode.links);
            println!("  Owner: uid {} gid {}", inode.uid, inode.gid);
            println!("  Modified: {}", inode.mtime);
            println!("  Zones: {:?}", inode.zone);
        }
        Commands::Info { image, json } => {
            let fs = open_session(&image, read_only)?;
            if json {
                let report = serde_json::json!({
                    "superblock": fs.superblock(),
                    "layout": fs.layout(),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                let sb = fs.superblock();
                let layout = fs.layout();
                println!("Minix filesystem (magic 0x{:04X})", sb.magic);
                println!("  Inodes: {}", sb.ninodes);
                println!("  Zones: {}", sb.nzones);
                println!("  Inode bitmap: {} block(s) from block {}", sb.imap_blocks, layout.imap_start);
                println!("  Zone bitmap: {} block(s) from block {}", sb.zmap_blocks, layout.zmap_start);
                println!("  Inode table: {} block(s) from block {}", layout.inode_table_blocks, layout.inode_table_start);
                println!("  First data zone: {}", sb.firstdatazone);
                println!("  Max file size: {} bytes", sb.maxfilesize);
                println!("  Directory entry size: {} bytes", layout.entry_size);
                println!("  Clean: {}", if sb.is_clean() { "Yes" } else { "No" });
            }
        }
        Commands::Format { image, inodes, blocks, name_len } => {
            let options = FormatOptions { inodes, blocks, name_len };
            // Validate before touching the file
            with_kind(MinixFormatter::plan(&options))?;
            let device = with_kind(ImageDevice::create(&image, blocks as u64 * 1024))
                .with_context(|| format!("Failed to create {}", image.display()))?;
            let mut file = with_kind(device.open_file())?;
            let sb = with_kind(MinixFormatter::format(&mut file, &options))?;
            println!(
                "Formatted {}: {} inodes, {} zones, data from zone {}",
                image.display(),
                sb.ninodes,
                sb.nzones,
                sb.firstdatazone
            );
        }
    }

    Ok(())
}
