//! Worker Pool Tests
//!
//! Tests verify:
//! - Only regular `.job` files are claimed
//! - Each job gets its own `.out` and numbered `.bck` files
//! - Many workers process many jobs without interference
//! - A broken job does not stop the pool

use std::fs;
use std::path::Path;

use partkv::config::Config;
use partkv::worker::{JobCursor, JobRunner};
use partkv::{BackupScheduler, Engine, WorkerPool};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write_job(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

fn config(dir: &Path, threads: usize, backups: usize) -> Config {
    Config::builder()
        .jobs_dir(dir)
        .max_threads(threads)
        .max_backups(backups)
        .build()
}

// =============================================================================
// Cursor Tests
// =============================================================================

#[test]
fn test_cursor_filters_job_files() {
    let temp = TempDir::new().unwrap();
    write_job(temp.path(), "a.job", "");
    write_job(temp.path(), "b.job", "");
    write_job(temp.path(), "notes.txt", "");
    write_job(temp.path(), "c.job.bak", "");
    fs::create_dir(temp.path().join("dir.job")).unwrap();

    let cursor = JobCursor::open(temp.path(), ".job").unwrap();
    let mut names: Vec<String> = std::iter::from_fn(|| cursor.next_job())
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert_eq!(names, vec!["a.job", "b.job"]);
    assert_eq!(cursor.next_job(), None);
}

#[test]
fn test_cursor_missing_directory() {
    let temp = TempDir::new().unwrap();
    assert!(JobCursor::open(&temp.path().join("nope"), ".job").is_err());
}

// =============================================================================
// Job Runner Tests
// =============================================================================

#[test]
fn test_runner_writes_output_file() {
    let temp = TempDir::new().unwrap();
    write_job(
        temp.path(),
        "test.job",
        "WRITE [(a,1)(b,2)(c,3)]\nREAD [c,a,z]\nDELETE [b,q]\nSHOW\nWAIT 1\nWAIT 0\n",
    );

    let config = config(temp.path(), 1, 1);
    let engine = Engine::new();
    let scheduler = BackupScheduler::new(1);
    let runner = JobRunner::new(&engine, &scheduler, &config);

    let report = runner.run(&temp.path().join("test.job")).unwrap();

    assert_eq!(
        read(temp.path(), "test.out"),
        "[(a,1)(c,3)(z,KVSERROR)]\n[(q,KVSMISSING)]\n(a, 1)\n(c, 3)\nWaiting...\n"
    );
    assert_eq!(report.commands, 6);
    assert_eq!(report.invalid, 0);
}

#[test]
fn test_runner_skips_invalid_commands() {
    let temp = TempDir::new().unwrap();
    write_job(temp.path(), "bad.job", "FOO\nWRITE [(a,1)]\nREAD [\nREAD [a]\n");

    let config = config(temp.path(), 1, 1);
    let engine = Engine::new();
    let scheduler = BackupScheduler::new(1);
    let report = JobRunner::new(&engine, &scheduler, &config)
        .run(&temp.path().join("bad.job"))
        .unwrap();

    assert_eq!(read(temp.path(), "bad.out"), "[(a,1)]\n");
    assert_eq!(report.invalid, 2);
    assert_eq!(report.commands, 2);
}

#[test]
fn test_runner_skips_non_utf8_lines() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("bytes.job"),
        b"WRITE [(a,1)]\nWRITE [(b,caf\xe9)]\nWRITE [(c,3)]\nREAD [a,c]\n",
    )
    .unwrap();

    let pool = WorkerPool::new(config(temp.path(), 1, 1)).unwrap();
    let summary = pool.run().unwrap();

    assert_eq!(summary.jobs_processed, 1);
    assert_eq!(summary.jobs_failed, 0);
    assert_eq!(read(temp.path(), "bytes.out"), "[(a,1)(c,3)]\n");
    assert_eq!(pool.engine().get("c").unwrap(), Some("3".to_string()));
    assert_eq!(pool.engine().get("b").unwrap(), None);
}

#[test]
fn test_runner_numbers_backups_per_job() {
    let temp = TempDir::new().unwrap();
    write_job(
        temp.path(),
        "snap.job",
        "WRITE [(a,1)]\nBACKUP\nWRITE [(b,2)]\nBACKUP\nDELETE [a]\nBACKUP\n",
    );

    let config = config(temp.path(), 1, 2);
    let engine = Engine::new();
    let scheduler = BackupScheduler::new(2);
    let report = JobRunner::new(&engine, &scheduler, &config)
        .run(&temp.path().join("snap.job"))
        .unwrap();
    scheduler.wait_all();

    assert_eq!(report.backups, 3);
    assert_eq!(read(temp.path(), "snap-1.bck"), "(a, 1)\n");
    assert_eq!(read(temp.path(), "snap-2.bck"), "(a, 1)\n(b, 2)\n");
    assert_eq!(read(temp.path(), "snap-3.bck"), "(b, 2)\n");
    assert_eq!(read(temp.path(), "snap.out"), "");
}

#[test]
fn test_runner_missing_job_file_is_error() {
    let temp = TempDir::new().unwrap();
    let config = config(temp.path(), 1, 1);
    let engine = Engine::new();
    let scheduler = BackupScheduler::new(1);

    let result = JobRunner::new(&engine, &scheduler, &config).run(&temp.path().join("ghost.job"));
    assert!(result.is_err());
}

// =============================================================================
// Pool Tests
// =============================================================================

#[test]
fn test_pool_rejects_zero_threads() {
    let temp = TempDir::new().unwrap();
    assert!(WorkerPool::new(config(temp.path(), 0, 1)).is_err());
    assert!(WorkerPool::new(config(temp.path(), 1, 0)).is_err());
}

#[test]
fn test_pool_processes_every_job() {
    let temp = TempDir::new().unwrap();
    let letters: Vec<char> = ('a'..='z').collect();
    for (i, letter) in letters.iter().enumerate() {
        let body = format!(
            "WRITE [({l}1,{i})({l}2,{i})]\nREAD [{l}2,{l}1]\nDELETE [{l}1]\nREAD [{l}1]\nBACKUP\n",
            l = letter,
            i = i
        );
        write_job(temp.path(), &format!("job{}.job", i), &body);
    }

    let pool = WorkerPool::new(config(temp.path(), 4, 2)).unwrap();
    let summary = pool.run().unwrap();

    assert_eq!(summary.workers, 4);
    assert_eq!(summary.jobs_processed, letters.len());
    assert_eq!(summary.jobs_failed, 0);
    assert_eq!(summary.backups_started, letters.len());
    assert_eq!(pool.scheduler().outstanding(), 0);
    assert!(pool.scheduler().peak_outstanding() <= 2);

    for (i, letter) in letters.iter().enumerate() {
        assert_eq!(
            read(temp.path(), &format!("job{}.out", i)),
            format!(
                "[({l}1,{i})({l}2,{i})]\n[({l}1,KVSERROR)]\n",
                l = letter,
                i = i
            )
        );
        assert!(temp.path().join(format!("job{}-1.bck", i)).exists());
    }
    assert_eq!(pool.engine().len().unwrap(), letters.len());
}

#[test]
fn test_pool_more_threads_than_jobs() {
    let temp = TempDir::new().unwrap();
    write_job(temp.path(), "only.job", "WRITE [(k,v)]\nSHOW\n");

    let pool = WorkerPool::new(config(temp.path(), 8, 1)).unwrap();
    let summary = pool.run().unwrap();

    assert_eq!(summary.jobs_processed, 1);
    assert_eq!(read(temp.path(), "only.out"), "(k, v)\n");
}

#[test]
fn test_pool_empty_directory() {
    let temp = TempDir::new().unwrap();
    let pool = WorkerPool::new(config(temp.path(), 2, 1)).unwrap();
    let summary = pool.run().unwrap();

    assert_eq!(summary.jobs_processed, 0);
    assert!(pool.engine().is_empty().unwrap());
}

#[test]
fn test_pool_missing_directory_is_error() {
    let temp = TempDir::new().unwrap();
    let pool = WorkerPool::new(config(&temp.path().join("absent"), 1, 1)).unwrap();
    assert!(pool.run().is_err());
}

#[test]
fn test_pool_with_uninitialized_engine_keeps_going() {
    let temp = TempDir::new().unwrap();
    write_job(temp.path(), "u.job", "WRITE [(a,1)]\nREAD [a]\nBACKUP\n");

    let pool = WorkerPool::with_engine(config(temp.path(), 1, 1), Engine::uninitialized()).unwrap();
    let summary = pool.run().unwrap();

    assert_eq!(summary.jobs_processed, 1);
    assert_eq!(summary.backups_started, 0);
    assert_eq!(read(temp.path(), "u.out"), "");
}
