//! The `id`, `list`, `download` and `igc` commands

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tini_protocol::{manufacturer, RangeSet, TrackDescriptor};
use tini_serial::{MinutesSeconds, ProgressEstimator, SerialChannel, Session};
use tracing::{debug, info, warn};

use crate::settings::{LogTarget, Settings};
use crate::PROGRAM_NAME;

/// Backspaces erasing the 15-column progress field
const ERASE: &str = "\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08\x08";

/// Open the device named in the settings
pub fn open_session(settings: &Settings) -> Result<Session<Box<dyn serialport::SerialPort>>> {
    let mut channel = SerialChannel::open(&settings.device)?;
    match &settings.log {
        Some(LogTarget::Stdout) => channel = channel.with_log(Box::new(io::stdout())),
        Some(LogTarget::File(path)) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("fopen: {}", path.display()))?;
            channel = channel.with_log(Box::new(file));
        }
        None => {}
    }
    Ok(Session::new(channel, settings.session.clone()))
}

/// Print the instrument identity as YAML
pub fn id<T: Read + Write>(session: &mut Session<T>, out: &mut impl Write) -> Result<()> {
    let identity = session.identity()?;
    let maker = manufacturer::by_instrument_id(&identity.instrument_id)
        .map_or("unknown", |m| m.manufacturer);

    writeln!(out, "--- ")?;
    writeln!(out, "instrument_id: \"{}\"", identity.instrument_id)?;
    writeln!(out, "manufacturer: \"{}\"", maker)?;
    writeln!(out, "pilot_name: \"{}\"", identity.trimmed_pilot_name())?;
    writeln!(out, "serial_number: {}", identity.serial_number)?;
    writeln!(out, "software_version: \"{}\"", identity.software_version)?;
    Ok(())
}

/// Print the track listing as YAML
pub fn list<T: Read + Write>(
    session: &mut Session<T>,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<()> {
    let tracks = session.tracks()?;
    writeln!(out, "--- ")?;
    for track in tracks {
        let d = track.duration_secs;
        writeln!(out, "- index: {}", track.index + 1)?;
        writeln!(out, "  time: {}", track.start.format("%Y-%m-%d %H:%M:%S +00:00"))?;
        writeln!(
            out,
            "  duration: \"{:02}:{:02}:{:02}\"",
            d / 3600,
            d / 60 % 60,
            d % 60
        )?;
        writeln!(out, "  igc_filename: {}", track.igc_filename)?;
    }
    if tracks.is_empty() && !settings.quiet {
        eprintln!("{}: no tracklogs", PROGRAM_NAME);
    }
    Ok(())
}

/// Download the selected tracks into the configured directory
///
/// Each list selects tracks by their 1-based position; no list selects all.
/// Returns the number of tracks written.
pub fn download<T: Read + Write>(
    session: &mut Session<T>,
    settings: &Settings,
    lists: &[String],
) -> Result<usize> {
    let mut selection = RangeSet::new();
    for list in lists {
        selection.merge(list)?;
    }

    let tracks = session.tracks()?.to_vec();
    let mut count = 0;
    for track in &tracks {
        if !lists.is_empty() && !selection.contains(track.index + 1) {
            continue;
        }
        let path = settings.directory.join(&track.igc_filename);
        if !settings.overwrite
            && path
                .try_exists()
                .with_context(|| format!("stat: {}", path.display()))?
        {
            debug!("Skipping existing {}", path.display());
            continue;
        }
        download_track(session, track, &path, settings.quiet)?;
        count += 1;
    }

    if !settings.quiet {
        if count > 0 {
            let plural = if count == 1 { "" } else { "s" };
            eprintln!("{}: {} tracklog{} downloaded", PROGRAM_NAME, count, plural);
        } else if tracks.is_empty() {
            eprintln!("{}: no tracklogs to download", PROGRAM_NAME);
        } else {
            eprintln!("{}: no new tracklogs to download", PROGRAM_NAME);
        }
    }
    Ok(count)
}

fn download_track<T: Read + Write>(
    session: &mut Session<T>,
    track: &TrackDescriptor,
    path: &Path,
    quiet: bool,
) -> Result<()> {
    info!("Downloading track {} to {}", track.index + 1, path.display());
    if !quiet {
        eprint!("{}: downloading {}  ", PROGRAM_NAME, track.igc_filename);
        eprint!("  0%           ");
    }

    let file = File::create(path).with_context(|| format!("fopen: {}", path.display()))?;
    let mut progress = ProgressEstimator::new(track);
    let result = write_track(session, track, &mut progress, BufWriter::new(file), quiet);
    if let Err(e) = result {
        if !quiet {
            eprintln!();
        }
        // Leave no partial tracklog behind
        if let Err(remove) = fs::remove_file(path) {
            warn!("Partial tracklog {} left behind: {}", path.display(), remove);
        }
        return Err(e.context(format!("download: {}", path.display())));
    }

    if !quiet {
        eprintln!("{}100%  {}    ", ERASE, MinutesSeconds(progress.elapsed()));
    }
    Ok(())
}

fn write_track<T: Read + Write>(
    session: &mut Session<T>,
    track: &TrackDescriptor,
    progress: &mut ProgressEstimator,
    mut out: impl Write,
    quiet: bool,
) -> Result<()> {
    for line in session.retrieve_track(track)? {
        let line = line?;
        out.write_all(line.as_bytes())?;
        if quiet {
            continue;
        }
        if let Some(update) = progress.observe(&line) {
            eprint!("{}{}", ERASE, update);
        }
    }
    out.flush()?;
    Ok(())
}

/// Write the track selected on the instrument
pub fn igc<T: Read + Write>(session: &mut Session<T>, out: &mut impl Write) -> Result<()> {
    for line in session.retrieve_selected_track()? {
        out.write_all(line?.as_bytes())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use tini_serial::SessionConfig;
    use tini_sim::{Faults, VirtualInstrument, VirtualInstrumentConfig, VirtualTrack};

    fn instrument() -> VirtualInstrumentConfig {
        let start = |day, hour| Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap();
        VirtualInstrumentConfig {
            tracks: vec![
                VirtualTrack::generate(start(18, 9), 3661, 60),
                VirtualTrack::generate(start(18, 14), 1800, 60),
                VirtualTrack::generate(start(19, 11), 5400, 60),
            ],
            selected: Some(2),
            ..Default::default()
        }
    }

    fn settings(directory: &Path) -> Settings {
        Settings {
            device: "/dev/sim".into(),
            directory: directory.to_path_buf(),
            log: None,
            session: SessionConfig::default(),
            overwrite: false,
            quiet: true,
            verbose: false,
        }
    }

    fn connect(config: VirtualInstrumentConfig) -> Session<VirtualInstrument> {
        connect_to(VirtualInstrument::new(config))
    }

    fn connect_to(instrument: VirtualInstrument) -> Session<VirtualInstrument> {
        let channel = SerialChannel::new("/dev/sim", instrument);
        Session::new(channel, SessionConfig::default())
    }

    #[test]
    fn test_id_output() {
        let mut session = connect(instrument());
        let mut out = Vec::new();
        id(&mut session, &mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "--- \n\
             instrument_id: \"6030\"\n\
             manufacturer: \"Flytec\"\n\
             pilot_name: \"Test Pilot\"\n\
             serial_number: 1234\n\
             software_version: \"3.28\"\n"
        );
    }

    #[test]
    fn test_list_output() {
        let mut session = connect(instrument());
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        list(&mut session, &settings(dir.path()), &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with(
            "--- \n\
             - index: 1\n  \
             time: 2024-05-18 09:00:00 +00:00\n  \
             duration: \"01:01:01\"\n  \
             igc_filename: 2024-05-18-FLY-1234-02.IGC\n"
        ));
        assert!(out.ends_with("  igc_filename: 2024-05-19-FLY-1234-01.IGC\n"));
    }

    #[test]
    fn test_download_selection_and_skip_existing() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let config = instrument();
        let expected: String = config.tracks[2].igc.concat();

        let mut session = connect(config.clone());
        let count = download(&mut session, &settings, &["3".to_string()]).unwrap();
        assert_eq!(count, 1);
        let written = fs::read_to_string(dir.path().join("2024-05-19-FLY-1234-01.IGC")).unwrap();
        assert_eq!(written, expected);
        assert!(!dir.path().join("2024-05-18-FLY-1234-02.IGC").exists());

        // Everything except the existing file
        let mut session = connect(config.clone());
        assert_eq!(download(&mut session, &settings, &[]).unwrap(), 2);
        let mut session = connect(config.clone());
        assert_eq!(download(&mut session, &settings, &[]).unwrap(), 0);

        let overwrite = Settings {
            overwrite: true,
            ..settings
        };
        let mut session = connect(config);
        assert_eq!(
            download(&mut session, &overwrite, &["1-2".into(), "-1".into()]).unwrap(),
            2
        );
    }

    #[test]
    fn test_download_rejects_bad_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = connect(instrument());
        let err = download(&mut session, &settings(dir.path()), &["1,x".into()]).unwrap_err();
        assert_eq!(err.to_string(), "invalid list: \"1,x\"");
        assert!(session.channel().get_ref().received_commands().is_empty());
    }

    #[test]
    fn test_interrupted_download_removes_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut faults = Faults::default();
        // Track content stops without the end-of-response marker
        faults
            .raw_responses
            .insert("PBRTR".into(), b"\x13AFLY05094\r\nB0900004700000N\r\n".to_vec());
        let mut session = connect_to(VirtualInstrument::new(instrument()).with_faults(faults));

        let err = download(&mut session, &settings(dir.path()), &["1".into()]).unwrap_err();
        let path = dir.path().join("2024-05-18-FLY-1234-02.IGC");
        assert_eq!(err.to_string(), format!("download: {}", path.display()));
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_igc_writes_selected_track() {
        let config = instrument();
        let expected = config.tracks[2].igc.concat();
        let mut session = connect(config);
        let mut out = Vec::new();
        igc(&mut session, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }
}
