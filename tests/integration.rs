use std::time::Duration;

use duct::cmd;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::Child;

use assert_cmd::cargo::cargo_bin;

async fn spawn_probe_server(listen: &str) -> Child {
    let mut child = tokio::process::Command::new(cargo_bin("conn-probe"))
        .arg("serve")
        .arg("--listen")
        .arg(listen)
        .stdout(std::process::Stdio::piped())
        .stderr(std::process::Stdio::piped())
        .spawn()
        .expect("Failed to start server binary");

    let stdout = child.stdout.take().unwrap();
    let stderr = child.stderr.take().unwrap();

    let mut stdout_reader = BufReader::new(stdout).lines();
    let mut stderr_reader = BufReader::new(stderr).lines();

    tokio::spawn(async move {
        while let Ok(Some(line)) = stdout_reader.next_line().await {
            eprintln!("[SERVER STDOUT] {}", line);
        }
    });

    tokio::spawn(async move {
        while let Ok(Some(line)) = stderr_reader.next_line().await {
            eprintln!("[SERVER STDERR] {}", line);
        }
    });

    child
}

async fn wait_for_port(addr: &str) {
    let start = std::time::Instant::now();
    loop {
        if TcpStream::connect(addr).await.is_ok() {
            return;
        }
        if start.elapsed() > Duration::from_secs(5) {
            panic!("Timeout waiting for {}", addr);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[tokio::test]
async fn test_non_persistent_run() {
    let mut child = spawn_probe_server(":8191").await;
    wait_for_port("127.0.0.1:8191").await;

    let output = cmd!(cargo_bin("conn-probe"), "run", "--addr", ":8191")
        .read()
        .unwrap();

    let lines: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("request "))
        .collect();
    assert_eq!(lines.len(), 5, "expected 5 report lines in:\n{}", output);
    for line in &lines {
        assert!(line.contains("status=200 OK"), "unexpected line: {}", line);
        assert!(
            line.ends_with("connection=close"),
            "unexpected line: {}",
            line
        );
    }

    child.kill().await.unwrap();
}

#[tokio::test]
async fn test_persistent_run() {
    let mut child = spawn_probe_server(":8192").await;
    wait_for_port("127.0.0.1:8192").await;

    let output = cmd!(
        cargo_bin("conn-probe"),
        "run",
        "--addr",
        ":8192",
        "--keep-alive"
    )
    .read()
    .unwrap();

    let lines: Vec<&str> = output
        .lines()
        .filter(|l| l.starts_with("request "))
        .collect();
    assert_eq!(lines.len(), 5, "expected 5 report lines in:\n{}", output);
    for line in &lines {
        assert!(line.contains("status=200 OK"), "unexpected line: {}", line);
        // no directive is advertised on the default route
        assert!(line.ends_with("connection="), "unexpected line: {}", line);
    }

    child.kill().await.unwrap();
}
