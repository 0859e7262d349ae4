// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// End-to-end runs of the `folio` binary.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use folio_document::testing::sample_pdf;
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::{TempDir, tempdir};

struct Run {
    status: i32,
    json: Value,
}

fn folio(out: &Path, args: &[&str]) -> Run {
    let output = Command::new(env!("CARGO_BIN_EXE_folio"))
        .arg("--output-dir")
        .arg(out)
        .args(args)
        .env("RUST_LOG", "off")
        .output()
        .expect("spawn folio");
    let stdout = String::from_utf8(output.stdout).expect("utf-8 stdout");
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 1, "expected one JSON line, got {stdout:?}");
    Run {
        status: output.status.code().unwrap_or(-1),
        json: serde_json::from_str(lines[0]).expect("valid JSON"),
    }
}

fn workspace(pages: usize) -> (TempDir, String, PathBuf) {
    let dir = tempdir().unwrap();
    let input = dir.path().join("report.pdf");
    std::fs::write(&input, sample_pdf(pages)).unwrap();
    let out = dir.path().join("out");
    (dir, input.to_string_lossy().into_owned(), out)
}

fn archive_members(path: &str) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
    (0..archive.len())
        .map(|i| archive.by_index(i).unwrap().name().to_string())
        .collect()
}

#[test]
fn split_by_count_produces_archive() {
    let (_dir, input, out) = workspace(7);
    let run = folio(&out, &["split", &input, "count", "fileCount=3"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.json["success"], true);
    assert_eq!(run.json["files_count"], 3);
    assert_eq!(run.json["original_pages"], 7);

    let path = run.json["output"].as_str().unwrap();
    assert!(path.ends_with(".zip"));
    assert_eq!(archive_members(path).len(), 3);
}

#[test]
fn split_flags_override_key_values() {
    let (_dir, input, out) = workspace(6);
    let run = folio(
        &out,
        &["split", &input, "every", "everyPages=1", "--every", "3"],
    );
    assert_eq!(run.json["files_count"], 2);
}

#[test]
fn split_single_group_is_plain_pdf() {
    let (_dir, input, out) = workspace(4);
    let run = folio(&out, &["split", &input, "ranges", "--ranges", "3,x"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.json["files_count"], 1);
    assert!(run.json["output"].as_str().unwrap().ends_with(".pdf"));
}

#[test]
fn extract_rejects_malformed_selection() {
    let (_dir, input, out) = workspace(4);
    let run = folio(&out, &["extract", &input, "1,abc"]);
    assert_eq!(run.status, 1);
    assert_eq!(run.json["success"], false);
    assert_eq!(run.json["kind"], "invalid_range_syntax");
}

#[test]
fn delete_all_pages_fails() {
    let (_dir, input, out) = workspace(3);
    let run = folio(&out, &["delete", &input, "1-3"]);
    assert_eq!(run.status, 1);
    assert_eq!(run.json["kind"], "all_pages_deleted");
    assert!(!out.exists() || std::fs::read_dir(&out).unwrap().next().is_none());
}

#[test]
fn rotate_accepts_negative_angle() {
    let (_dir, input, out) = workspace(2);
    let run = folio(&out, &["rotate", &input, "-90", "--pages", "1"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.json["rotation"], -90);
    assert_eq!(run.json["pages_rotated"], 1);
}

#[test]
fn organize_with_bad_json_fails() {
    let (_dir, input, out) = workspace(2);
    let run = folio(&out, &["organize", &input, "{order"]);
    assert_eq!(run.status, 1);
    assert_eq!(run.json["kind"], "invalid_parameter");
}

#[test]
fn crop_defaults_missing_margins_to_zero() {
    let (_dir, input, out) = workspace(2);
    let run = folio(&out, &["crop", &input, "36", "72"]);
    assert_eq!(run.status, 0);
    assert_eq!(run.json["pages_cropped"], 2);
}

#[test]
fn crop_consuming_the_page_is_invalid_parameter() {
    let (_dir, input, out) = workspace(1);
    let run = folio(&out, &["crop", &input, "400", "0", "400", "0"]);
    assert_eq!(run.status, 1);
    assert_eq!(run.json["kind"], "invalid_parameter");
}

#[test]
fn merge_concatenates_inputs() {
    let (dir, first, out) = workspace(2);
    let second = dir.path().join("appendix.pdf");
    std::fs::write(&second, sample_pdf(3)).unwrap();
    let run = folio(&out, &["merge", &first, &second.to_string_lossy()]);
    assert_eq!(run.status, 0);
    assert_eq!(run.json["files_merged"], 2);
    assert_eq!(run.json["pages"], 5);
}

#[test]
fn info_writes_nothing() {
    let (_dir, input, out) = workspace(3);
    let run = folio(&out, &["info", &input]);
    assert_eq!(run.status, 0);
    assert_eq!(run.json["pages"], 3);
    assert!(run.json.get("output").is_none());
    assert!(!out.exists());
}

#[test]
fn missing_file_reports_not_found() {
    let (dir, _input, out) = workspace(1);
    let missing = dir.path().join("absent.pdf");
    let run = folio(&out, &["info", &missing.to_string_lossy()]);
    assert_eq!(run.status, 1);
    assert_eq!(run.json["kind"], "not_found");
}

#[test]
fn usage_errors_are_reported_as_json() {
    let (_dir, _input, out) = workspace(1);
    let run = folio(&out, &["rotate"]);
    assert_eq!(run.status, 1);
    assert_eq!(run.json["success"], false);
    assert!(run.json["error"].as_str().is_some());
}
