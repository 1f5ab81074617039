// Integration tests against real image files on disk

use mfstool_core::{ErrorKind, FormatOptions, FsOptions, ImageDevice};
use mfstool_filesystems::{MinixFormatter, MinixFs};
use tempfile::TempDir;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn format_image(dir: &TempDir, name_len: usize) -> ImageDevice {
    let options = FormatOptions { inodes: 96, blocks: 360, name_len };
    let device = ImageDevice::create(dir.path().join("minix.img"), options.blocks as u64 * 1024)
        .expect("Failed to create image");
    let mut file = device.open_file().unwrap();
    MinixFormatter::format(&mut file, &options).expect("Format failed");
    device
}

#[test]
fn test_changes_persist_across_sessions() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let device = format_image(&dir, 30);

    {
        let mut fs = MinixFs::open(device.open_file().unwrap(), FsOptions::default()).unwrap();
        fs.mkdir("/docs").unwrap();
        fs.touch("/docs/readme").unwrap();
        fs.append("/docs/readme", b"hello world").unwrap();
        fs.append("/docs/readme", &vec![b'-'; 2000]).unwrap();
    }

    let device = ImageDevice::open(&device.path, true).unwrap();
    let mut fs = MinixFs::open(device.open_file().unwrap(), FsOptions::read_only()).unwrap();

    let root = fs.list("/").unwrap();
    assert!(root.contains_key(b"docs".as_slice()));

    let content = fs.read_file("/docs/readme").unwrap();
    assert_eq!(content.len(), 2011);
    assert_eq!(&content[..11], b"hello world");
    assert!(content[11..].iter().all(|&b| b == b'-'));

    assert_eq!(fs.touch("/docs/other").unwrap_err().kind(), ErrorKind::ReadOnly);
}

#[test]
fn test_short_name_variant_on_disk() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let device = format_image(&dir, 14);

    let mut fs = MinixFs::open(device.open_file().unwrap(), FsOptions::default()).unwrap();
    assert_eq!(fs.superblock().magic, 0x137F);
    assert_eq!(fs.layout().entry_size, 16);

    fs.touch("a-fourteen-chr").unwrap();
    assert_eq!(fs.touch("a-fifteen-chars").unwrap_err().kind(), ErrorKind::NameTooLong);
    assert_eq!(fs.read_file("a-fourteen-chr").unwrap(), Vec::<u8>::new());
}

#[test]
fn test_not_an_image() {
    init_logging();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage.img");
    std::fs::write(&path, vec![0x5Au8; 4096]).unwrap();

    let device = ImageDevice::open(&path, true).unwrap();
    let err = MinixFs::open(device.open_file().unwrap(), FsOptions::read_only()).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::FormatError);
}
