//! Managed file behavior through the public `Logger` API.

use std::fs::File;
use std::path::Path;

use logfan_core::config::{FILE_ROLL_SIZE, MAX_FILES};
use logfan_core::{
    get_last_error, make_default_config, ErrorCode, FileId, Levels, LogError, Logger, Options,
};
use tempfile::TempDir;

fn quiet_logger() -> Logger {
    let logger = Logger::new();
    logger
        .initialize(
            make_default_config()
                .with_stdout(Levels::NONE, Options::DEFAULT)
                .with_stderr(Levels::NONE, Options::DEFAULT)
                .with_syslog(Levels::NONE, Options::DEFAULT),
        )
        .unwrap();
    logger
}

fn path_str(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

fn files_named(dir: &Path, stem: &str) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(stem))
        .collect();
    names.sort();
    names
}

#[test]
fn test_cache_full_does_not_open_file() {
    let temp = TempDir::new().unwrap();
    let logger = quiet_logger();
    for n in 0..MAX_FILES {
        logger
            .add_file(&path_str(temp.path(), &format!("{n}.log")), Levels::ALL, Options::ALL)
            .unwrap();
    }

    let extra = path_str(temp.path(), "overflow.log");
    assert_eq!(
        logger.add_file(&extra, Levels::ALL, Options::ALL),
        Err(LogError::CacheFull(MAX_FILES))
    );
    assert_eq!(get_last_error().0, ErrorCode::CacheFull);
    assert!(!Path::new(&extra).exists());
    assert_eq!(logger.files().unwrap().len(), MAX_FILES);
    logger.shutdown().unwrap();
}

#[test]
fn test_duplicate_add_rejected() {
    let temp = TempDir::new().unwrap();
    let logger = quiet_logger();
    let path = path_str(temp.path(), "dup.log");

    let id = logger.add_file(&path, Levels::ALL, Options::ALL).unwrap();
    assert!(matches!(
        logger.add_file(&path, Levels::ERROR, Options::MSGONLY),
        Err(LogError::DuplicateFile(_))
    ));

    let files = logger.files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, id);
    assert_eq!(files[0].levels, Levels::ALL);
    logger.shutdown().unwrap();
}

#[test]
fn test_remove_unknown_mutates_nothing() {
    let temp = TempDir::new().unwrap();
    let logger = quiet_logger();
    let id = logger
        .add_file(&path_str(temp.path(), "keep.log"), Levels::ALL, Options::ALL)
        .unwrap();

    let bogus = FileId::from_raw(u32::MAX);
    assert_eq!(
        logger.remove_file(bogus),
        Err(LogError::FileNotFound(u32::MAX))
    );
    assert_eq!(get_last_error().0, ErrorCode::FileNotFound);
    assert_eq!(logger.remove_file(FileId::NULL), Err(LogError::NullPointer));

    let files = logger.files().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].id, id);
    logger.shutdown().unwrap();
}

#[test]
fn test_levels_and_opts_round_trip() {
    let temp = TempDir::new().unwrap();
    let logger = quiet_logger();
    let id = logger
        .add_file(&path_str(temp.path(), "rt.log"), Levels::DEFAULT, Options::DEFAULT)
        .unwrap();

    for levels in [Levels::NONE, Levels::ERROR | Levels::DEBUG, Levels::ALL] {
        logger.set_file_levels(id, levels).unwrap();
        assert_eq!(logger.file_levels(id).unwrap(), levels);
    }

    logger.set_file_opts(id, Options::NOTIME | Options::NOHDR).unwrap();
    assert_eq!(
        logger.file_opts(id).unwrap(),
        Options::NOTIME | Options::NOHDR
    );

    logger.set_file_opts(id, Options::DEFAULT).unwrap();
    assert_eq!(logger.file_opts(id).unwrap(), Options::NOHOST);
    logger.shutdown().unwrap();
}

#[test]
fn test_relative_path_is_resolved() {
    let logger = quiet_logger();
    let name = format!("logfan-relative-{}.log", std::process::id());
    let id = logger.add_file(&name, Levels::ALL, Options::ALL).unwrap();

    let info = logger.files().unwrap().into_iter().find(|f| f.id == id).unwrap();
    assert!(info.path.is_absolute());
    assert!(info.path.ends_with(&name));

    let dotted = format!("./{name}");
    assert!(matches!(
        logger.add_file(&dotted, Levels::ALL, Options::ALL),
        Err(LogError::DuplicateFile(_))
    ));

    logger.remove_file(id).unwrap();
    std::fs::remove_file(&info.path).unwrap();
    logger.shutdown().unwrap();
}

#[test]
fn test_rollover_leaves_exactly_two_files() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("rollandarchive.log");

    // Start just under the threshold so a few lines trigger the roll.
    let prefill = FILE_ROLL_SIZE - 1024;
    let file = File::create(&path).unwrap();
    file.set_len(prefill).unwrap();
    drop(file);

    let logger = quiet_logger();
    let id = logger
        .add_file(path.to_str().unwrap(), Levels::ALL, Options::DEFAULT)
        .unwrap();

    let mut rolled = false;
    for n in 0..200 {
        logger
            .info(format_args!("filler line {n:04} {}", "x".repeat(64)))
            .unwrap();
        let size = logger.files().unwrap()[0].size;
        if size < prefill {
            rolled = true;
            break;
        }
    }
    assert!(rolled, "file never rolled over");

    let names = files_named(temp.path(), "rollandarchive");
    assert_eq!(names.len(), 2, "{names:?}");
    assert!(names.contains(&"rollandarchive.log".to_string()));

    let fresh = std::fs::read_to_string(&path).unwrap();
    assert!(fresh.starts_with("----- archived as rollandarchive-"));

    logger.remove_file(id).unwrap();
    logger.shutdown().unwrap();
}

#[test]
fn test_rollover_without_header() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("plain.log");
    let file = File::create(&path).unwrap();
    file.set_len(FILE_ROLL_SIZE - 8).unwrap();
    drop(file);

    let logger = quiet_logger();
    logger
        .add_file(path.to_str().unwrap(), Levels::ALL, Options::MSGONLY | Options::NOHDR)
        .unwrap();
    logger.notice(format_args!("after the roll")).unwrap();

    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        "after the roll\n"
    );
    assert_eq!(files_named(temp.path(), "plain").len(), 2);
    logger.shutdown().unwrap();
}

#[test]
fn test_file_level_filtering() {
    let temp = TempDir::new().unwrap();
    let logger = quiet_logger();
    let errors = temp.path().join("errors.log");
    let debug = temp.path().join("debug.log");
    logger
        .add_file(
            errors.to_str().unwrap(),
            Levels::ERROR | Levels::CRIT,
            Options::MSGONLY,
        )
        .unwrap();
    logger
        .add_file(debug.to_str().unwrap(), Levels::DEBUG, Options::MSGONLY)
        .unwrap();

    logger.debug(format_args!("d1")).unwrap();
    logger.error(format_args!("e1")).unwrap();
    logger.crit(format_args!("c1")).unwrap();
    assert_eq!(
        logger.info(format_args!("i1")),
        Err(LogError::NoDestination("info"))
    );

    assert_eq!(std::fs::read_to_string(&errors).unwrap(), "e1\nc1\n");
    assert_eq!(std::fs::read_to_string(&debug).unwrap(), "d1\n");
    logger.shutdown().unwrap();
}
