use std::path::PathBuf;
use std::process;

use purgef::{purge, FillKind, PurgeConfig, Status};
use structopt::StructOpt;
use tracing::{error, Level};

#[derive(StructOpt, Debug)]
#[structopt(name = "purgef", after_help = AFTER_HELP)]
struct Opt {
    #[structopt(short, long, parse(from_os_str), help = "File or folder to purge")]
    path: PathBuf,
    #[structopt(
        short,
        long,
        alias = "n-passes",
        help = "Number of n passes",
        default_value = "3"
    )]
    repeat: usize,
    #[structopt(
        short,
        long,
        possible_values = &["zero", "random"],
        help = "What every pass writes: 0x00 bytes or secure random bytes"
    )]
    kind: FillKind,
    #[structopt(short, long, help = "Run on verbose mode")]
    verbose: bool,
}

fn main() {
    let opt = Opt::from_args();
    tracing_subscriber::fmt()
        .with_max_level(if opt.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .init();

    let config = match PurgeConfig::new(&opt.path, opt.repeat, opt.kind) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    let report = purge(&config);
    println!("{}", report);
    process::exit(match report.status {
        Status::Done => 0,
        Status::PartiallyFailed => 1,
        Status::Aborted(_) => 2,
    });
}

static AFTER_HELP: &str =
    "Every regular file under PATH is overwritten --repeat times, synced to disk\n\
     after each pass, and unlinked. Directories are removed deepest first once they\n\
     are empty. Symlinks, devices, fifos and sockets are never opened: they are\n\
     reported and left in place, together with the directories that contain them.\n\
     \n\
     Exit status is 0 when PATH is gone, 1 when something survived, and 2 when\n\
     nothing was touched.\n\
     \n\
     CAUTION: overwriting only destroys data on file systems that write in place.\n\
     It is not effective, or not guaranteed to be, on:\n\
     \n\
     * log-structured, journaling or copy-on-write file systems (data=journal ext3/ext4,\n\
     btrfs, ZFS, APFS)\n\
     \n\
     * RAID and other file systems that keep redundant copies or snapshots\n\
     \n\
     * network file systems that cache in temporary locations\n\
     \n\
     * compressed file systems\n\
     \n\
     * SSDs and flash media, where wear-levelling moves rewritten blocks\n\
     \n\
     Backups and remote mirrors may also hold copies that a purge cannot reach.\n\
     ";
