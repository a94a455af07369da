mod capture;

use self::capture::CaptureController;
use anyhow::{Context, Result};
use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use nvme_logpage::{logpage, LogPageRequest};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::io::Write;
use std::path::PathBuf;

fn cli() -> Command {
    Command::new("nvme-logpage")
        .version(crate_version!())
        .about("Decode an NVMe log page captured from a controller")
        .arg(
            Arg::new("page")
                .short('p')
                .long("page")
                .required(true)
                .value_parser(parse_page_id)
                .help("Log page identifier, decimal or 0x prefixed hex"),
        )
        .arg(
            Arg::new("hex")
                .short('x')
                .long("hex")
                .action(ArgAction::SetTrue)
                .help("Dump the page as hex instead of decoding it"),
        )
        .arg(
            Arg::new("namespace")
                .short('n')
                .long("namespace")
                .value_parser(parse_nsid)
                .help("Namespace to request the page for"),
        )
        .arg(
            Arg::new("ns-smart")
                .long("ns-smart")
                .action(ArgAction::SetTrue)
                .help("Controller keeps SMART/health data per namespace"),
        )
        .arg(
            Arg::new("elpe")
                .long("elpe")
                .value_parser(value_parser!(u8))
                .help("Zero based error log entry count [default: from capture size]"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("More log output on stderr (-v, -vv, -vvv)"),
        )
        .arg(
            Arg::new("capture")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("File holding the raw log page"),
        )
}

fn parse_number(s: &str) -> std::result::Result<u32, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number {:?}: {}", s, e))
}

fn parse_page_id(s: &str) -> std::result::Result<u8, String> {
    let id = parse_number(s)?;
    u8::try_from(id).map_err(|_| format!("log page id {:#x} out of range", id))
}

fn parse_nsid(s: &str) -> std::result::Result<u32, String> {
    parse_number(s)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn request(matches: &ArgMatches) -> Result<LogPageRequest> {
    let page = matches
        .get_one::<u8>("page")
        .copied()
        .context("log page id is required")?;

    Ok(LogPageRequest {
        page,
        namespace: matches.get_one::<u32>("namespace").copied(),
        hex: matches.get_flag("hex"),
    })
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    init_logging(matches.get_count("verbose"));

    let request = request(&matches)?;
    let path = matches
        .get_one::<PathBuf>("capture")
        .context("capture file is required")?;

    let mut controller = CaptureController::open(path)?
        .namespace_smart(matches.get_flag("ns-smart"))
        .error_log_entries(matches.get_one::<u8>("elpe").copied());

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    logpage(&mut controller, &request, &mut out)?;
    out.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn page_ids() {
        assert_eq!(parse_page_id("2"), Ok(2));
        assert_eq!(parse_page_id("0xc1"), Ok(0xc1));
        assert_eq!(parse_page_id("0XCA"), Ok(0xca));
        assert!(parse_page_id("256").is_err());
        assert!(parse_page_id("0xzz").is_err());
        assert!(parse_page_id("").is_err());
    }

    #[test]
    fn request_from_args() {
        let matches = cli().get_matches_from(["nvme-logpage", "-p", "0x02", "-n", "1", "-x", "f"]);
        let request = request(&matches).unwrap();
        assert_eq!(
            request,
            LogPageRequest {
                page: 2,
                namespace: Some(1),
                hex: true
            }
        );
    }
}
