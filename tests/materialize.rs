//! Tests for copying a subset's files into a directory.

use csv_dataset_manager::materialize::{FileCopier, FileMaterializer, destination_for, materialize};
use csv_dataset_manager::partition::RowSubset;
use csv_dataset_manager::{PartitionError, Row, Table, Value, load};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn path_table(paths: &[Value]) -> Table {
    Table::new(
        vec!["image_path".into()],
        paths.iter().map(|p| Row::new(vec![p.clone()])).collect(),
    )
    .unwrap()
}

fn path_value(p: &Path) -> Value {
    Value::Str(p.to_string_lossy().into_owned())
}

/// Records every copy and fails on the `fail_at`-th call.
struct RecordingCopier {
    calls: RefCell<Vec<(PathBuf, PathBuf)>>,
    fail_at: Option<usize>,
}

impl FileCopier for &RecordingCopier {
    fn copy(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        let mut calls = self.calls.borrow_mut();
        calls.push((src.to_path_buf(), dst.to_path_buf()));
        if Some(calls.len()) == self.fail_at {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        Ok(1)
    }
}

#[test]
fn copies_each_file_under_its_basename() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src_dir = tmp.path().join("imgs").join("nested");
    let dst = tmp.path().join("dst");
    fs::create_dir_all(&src_dir)?;
    fs::create_dir(&dst)?;
    fs::write(src_dir.join("1.png"), b"one")?;
    fs::write(src_dir.join("3.png"), b"three")?;

    let table = path_table(&[
        path_value(&src_dir.join("1.png")),
        path_value(&src_dir.join("3.png")),
    ]);
    let report = materialize(&RowSubset::all(&table), "image_path", &dst)?;

    assert_eq!(report.files_copied, 2);
    assert_eq!(report.bytes_copied, 8);
    assert!(report.collisions.is_empty());
    assert_eq!(fs::read(dst.join("1.png"))?, b"one");
    assert_eq!(fs::read(dst.join("3.png"))?, b"three");
    Ok(())
}

#[test]
fn preserves_modification_time() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let src = tmp.path().join("old.png");
    let dst = tmp.path().join("dst");
    fs::create_dir(&dst)?;
    fs::write(&src, b"old")?;
    let mtime = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000_000);
    fs::File::options()
        .write(true)
        .open(&src)?
        .set_modified(mtime)?;

    let table = path_table(&[path_value(&src)]);
    materialize(&RowSubset::all(&table), "image_path", &dst)?;

    assert_eq!(fs::metadata(dst.join("old.png"))?.modified()?, mtime);
    Ok(())
}

#[test]
fn basename_collision_is_last_write_wins() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let a = tmp.path().join("a");
    let b = tmp.path().join("b");
    let dst = tmp.path().join("dst");
    for d in [&a, &b, &dst] {
        fs::create_dir(d)?;
    }
    fs::write(a.join("img.png"), b"from a")?;
    fs::write(b.join("img.png"), b"from b")?;

    let table = path_table(&[path_value(&a.join("img.png")), path_value(&b.join("img.png"))]);
    let report = materialize(&RowSubset::all(&table), "image_path", &dst)?;

    assert_eq!(fs::read_dir(&dst)?.count(), 1);
    assert_eq!(fs::read(dst.join("img.png"))?, b"from b");
    assert_eq!(report.files_copied, 2);
    assert_eq!(report.collisions.len(), 1);
    assert_eq!(report.collisions[0].file_name, "img.png");
    assert_eq!(report.collisions[0].previous, a.join("img.png"));
    assert_eq!(report.collisions[0].replacement, b.join("img.png"));
    Ok(())
}

#[test]
fn missing_source_fails_and_stops() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dst = tmp.path().join("dst");
    fs::create_dir(&dst)?;
    fs::write(tmp.path().join("1.png"), b"one")?;
    fs::write(tmp.path().join("3.png"), b"three")?;

    let table = path_table(&[
        path_value(&tmp.path().join("1.png")),
        path_value(&tmp.path().join("2.png")),
        path_value(&tmp.path().join("3.png")),
    ]);
    let err = materialize(&RowSubset::all(&table), "image_path", &dst).unwrap_err();

    match err {
        PartitionError::Copy { src, dst: to, source } => {
            assert_eq!(src, tmp.path().join("2.png"));
            assert_eq!(to, dst.join("2.png"));
            assert_eq!(source.kind(), io::ErrorKind::NotFound);
        }
        other => panic!("unexpected error: {other}"),
    }
    // copies before the failure stay, nothing after it is attempted
    assert!(dst.join("1.png").exists());
    assert!(!dst.join("3.png").exists());
    Ok(())
}

#[test]
fn first_copy_failure_aborts_remaining_rows() {
    let table = path_table(&[
        Value::Str("/x/1.png".into()),
        Value::Str("/x/2.png".into()),
        Value::Str("/x/3.png".into()),
    ]);
    let copier = RecordingCopier {
        calls: RefCell::new(Vec::new()),
        fail_at: Some(2),
    };
    let materializer = FileMaterializer::with_copier(&copier);

    let result = materializer.materialize(&RowSubset::all(&table), "image_path", Path::new("/out"));
    assert!(matches!(result, Err(PartitionError::Copy { .. })));
    assert_eq!(copier.calls.borrow().len(), 2);
}

#[test]
fn copies_in_subset_order() -> anyhow::Result<()> {
    let table = path_table(&[
        Value::Str("/x/a.png".into()),
        Value::Str("/y/b.png".into()),
        Value::Str("/z/c.png".into()),
    ]);
    let copier = RecordingCopier {
        calls: RefCell::new(Vec::new()),
        fail_at: None,
    };
    let materializer = FileMaterializer::with_copier(&copier);
    let subset = RowSubset::new(&table, vec![2, 0]);

    let report = materializer.materialize(&subset, "image_path", Path::new("/out"))?;
    assert_eq!(report.files_copied, 2);
    assert_eq!(
        *copier.calls.borrow(),
        vec![
            (PathBuf::from("/z/c.png"), PathBuf::from("/out/c.png")),
            (PathBuf::from("/x/a.png"), PathBuf::from("/out/a.png")),
        ]
    );
    Ok(())
}

#[test]
fn null_path_cell_is_reported() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let table = path_table(&[Value::Null]);
    let err = materialize(&RowSubset::all(&table), "image_path", tmp.path()).unwrap_err();
    assert!(matches!(err, PartitionError::MissingFilePath { row: 1, .. }));
    Ok(())
}

#[test]
fn missing_path_column_fails_for_non_empty_subset() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let table = path_table(&[Value::Str("/x/1.png".into())]);

    let err = materialize(&RowSubset::all(&table), "path", tmp.path()).unwrap_err();
    assert!(matches!(err, PartitionError::UnknownColumn { .. }));

    let empty = RowSubset::new(&table, vec![]);
    let report = materialize(&empty, "path", tmp.path())?;
    assert_eq!(report.files_copied, 0);
    Ok(())
}

#[test]
fn destination_uses_only_the_final_component() -> anyhow::Result<()> {
    let dst = destination_for(Path::new("/a/b/c/img.png"), Path::new("/out/target"))?;
    assert_eq!(dst, Path::new("/out/target/img.png"));

    let dst = destination_for(Path::new("relative/img.png"), Path::new("out"))?;
    assert_eq!(dst, Path::new("out/img.png"));

    assert!(destination_for(Path::new("/"), Path::new("out")).is_err());
    Ok(())
}

#[test]
fn numeric_looking_paths_are_copied_verbatim() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let csv = tmp.path().join("labels.csv");
    // both cells parse as numbers, so the column is inferred as float
    fs::write(&csv, "label,image_path\ncat,0001\ncat,1.10\n")?;
    let table = load(&csv)?;
    assert_eq!(table.cell(0, "image_path"), Some(&Value::Float(1.0)));

    let copier = RecordingCopier {
        calls: RefCell::new(Vec::new()),
        fail_at: None,
    };
    FileMaterializer::with_copier(&copier).materialize(
        &RowSubset::all(&table),
        "image_path",
        Path::new("/out"),
    )?;

    assert_eq!(
        *copier.calls.borrow(),
        vec![
            (PathBuf::from("0001"), PathBuf::from("/out/0001")),
            (PathBuf::from("1.10"), PathBuf::from("/out/1.10")),
        ]
    );
    Ok(())
}

#[test]
fn integer_path_column_copies_the_named_file() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let dst = tmp.path().join("dst");
    fs::create_dir(&dst)?;
    let csv = tmp.path().join("labels.csv");
    fs::write(&csv, "label,image_path\ncat,0001\ncat,0002\n")?;
    let table = load(&csv)?;
    assert_eq!(table.cell(0, "image_path"), Some(&Value::Int(1)));

    let copier = RecordingCopier {
        calls: RefCell::new(Vec::new()),
        fail_at: None,
    };
    let report = FileMaterializer::with_copier(&copier).materialize(
        &RowSubset::all(&table),
        "image_path",
        &dst,
    )?;

    assert_eq!(report.files_copied, 2);
    let sources: Vec<PathBuf> = copier.calls.borrow().iter().map(|(s, _)| s.clone()).collect();
    assert_eq!(sources, vec![PathBuf::from("0001"), PathBuf::from("0002")]);
    Ok(())
}
