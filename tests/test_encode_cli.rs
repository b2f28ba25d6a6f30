use assert_cmd::Command;
use assert_fs::{prelude::FileWriteStr, NamedTempFile};
use predicates::prelude::{predicate, PredicateBooleanExt};

const INSTANCE: &str = "((a,b),c);\n(a,(b,c));\n";

// logging goes to stdout, so it is turned off to keep the output checks
// on the CNF document only; the temp file is returned so it outlives the
// command run
fn encode_cmd(
    instance: &str,
    args: &[&str],
) -> Result<(Command, NamedTempFile), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("test_instance.nwk")?;
    file.write_str(instance)?;
    let mut cmd = Command::cargo_bin("phylocnf")?;
    cmd.arg("encode")
        .arg("-f")
        .arg(file.path())
        .arg("--logging-level")
        .arg("off");
    for a in args {
        cmd.arg(a);
    }
    Ok((cmd, file))
}

#[test]
fn test_encode_to_stdout() -> Result<(), Box<dyn std::error::Error>> {
    let (mut cmd, _file) = encode_cmd(INSTANCE, &["-k", "1"])?;
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("p cnf "));
    Ok(())
}

#[test]
fn test_encode_comments_present_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let (mut cmd, _file) = encode_cmd(INSTANCE, &["-k", "0"])?;
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("c n = 3; k = 0; trees count = 2"));
    Ok(())
}

#[test]
fn test_encode_no_comments() -> Result<(), Box<dyn std::error::Error>> {
    let (mut cmd, _file) = encode_cmd(INSTANCE, &["-k", "0", "--no-comments"])?;
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\nc ").not());
    Ok(())
}

#[test]
fn test_encode_to_file() -> Result<(), Box<dyn std::error::Error>> {
    let out = NamedTempFile::new("test_out.cnf")?;
    let (mut cmd, _file) =
        encode_cmd(INSTANCE, &["-k", "1", "-o", out.path().to_str().unwrap()])?;
    cmd.assert().success();
    let content = std::fs::read_to_string(out.path())?;
    assert!(content.starts_with("p cnf "));
    assert!(content.trim_end().ends_with(" 0"));
    out.close().unwrap();
    Ok(())
}

#[test]
fn test_encode_with_reticulation_connection() -> Result<(), Box<dyn std::error::Error>> {
    let (mut cmd, _file) = encode_cmd(INSTANCE, &["-k", "2", "--reticulation-connection"])?;
    cmd.assert()
        .success()
        .stdout(predicate::str::starts_with("p cnf "));
    Ok(())
}

#[test]
fn test_encode_missing_hybridization_number() -> Result<(), Box<dyn std::error::Error>> {
    let file = NamedTempFile::new("test_instance.nwk")?;
    file.write_str(INSTANCE)?;
    let mut cmd = Command::cargo_bin("phylocnf")?;
    cmd.arg("encode").arg("-f").arg(file.path());
    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_encode_non_numeric_hybridization_number() -> Result<(), Box<dyn std::error::Error>> {
    let (mut cmd, _file) = encode_cmd(INSTANCE, &["-k", "two"])?;
    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_encode_unknown_input_file() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("phylocnf")?;
    cmd.arg("encode")
        .arg("-f")
        .arg("/this/path/does/not/exist.nwk")
        .arg("-k")
        .arg("1");
    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_encode_invalid_tree() -> Result<(), Box<dyn std::error::Error>> {
    let (mut cmd, _file) = encode_cmd("((a,b),c);(a,(b,d));", &["-k", "1"])?;
    cmd.assert().failure();
    Ok(())
}

#[test]
fn test_encode_deterministic_output() -> Result<(), Box<dyn std::error::Error>> {
    let (mut first_cmd, _first_file) = encode_cmd(INSTANCE, &["-k", "2", "--no-comments"])?;
    let first = first_cmd.assert().success();
    let (mut second_cmd, _second_file) = encode_cmd(INSTANCE, &["-k", "2", "--no-comments"])?;
    let second = second_cmd.assert().success();
    assert_eq!(
        first.get_output().stdout,
        second.get_output().stdout
    );
    Ok(())
}

#[test]
fn test_help_does_not_fail() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("phylocnf")?;
    cmd.arg("help").arg("encode");
    cmd.assert().success();
    Ok(())
}
