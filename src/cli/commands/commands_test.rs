use super::*;
use crate::cli::testing::{MockExecutor, ScriptedConsole};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::TempDir;

const LS_OUTPUT: &str = "There are screens on:\n\
    \t12345.nexus-512\t(05/01/2025 10:00:00 AM)\t(Detached)\n\
    \t23456.nexus-prover-204\t(05/01/2025 10:05:00 AM)\t(Detached)\n\
    2 Sockets in /run/screen/S-root.\n";

const LDD_2_35: &str = "ldd (Ubuntu GLIBC 2.35-0ubuntu3.8) 2.35\n\
    Copyright (C) 2022 Free Software Foundation, Inc.\n";

const LDD_2_39: &str = "ldd (Ubuntu GLIBC 2.39-0ubuntu8) 2.39\n";

/// A user home with an installed node client and a manager driven by a mock
/// executor
struct TestEnv {
    temp_dir: TempDir,
    mock: Arc<MockExecutor>,
    manager: NodeManager,
}

impl TestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let bin_dir = temp_dir.path().join(".local").join("bin");
        fs::create_dir_all(&bin_dir).unwrap();
        let cli = bin_dir.join(NEXUS_CLI_NAME);
        fs::write(&cli, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&cli, fs::Permissions::from_mode(0o755)).unwrap();

        let mock = Arc::new(MockExecutor::new());
        let paths = ToolPaths {
            screen: Some(PathBuf::from("/usr/bin/screen")),
            nexus_cli: Some(cli),
            rustc: None,
        };
        let manager = NodeManager::new(Settings::new(temp_dir.path()), paths, mock.clone());
        Self {
            temp_dir,
            mock,
            manager,
        }
    }

    fn without_screen(mut self) -> Self {
        self.manager.paths.screen = None;
        self
    }

    fn without_cli(mut self) -> Self {
        self.manager.paths.nexus_cli = None;
        self
    }

    fn with_node_id(mut self, node_id: &str) -> Self {
        self.manager.config.node_id = Some(node_id.to_string());
        self
    }

    fn home(&self) -> &Path {
        self.temp_dir.path()
    }

    fn saved(&self) -> NodeConfig {
        NodeConfig::load(&self.manager.settings.config_path).unwrap()
    }

    async fn perform(&mut self, action: Action, inputs: &[&str]) -> (Flow, ScriptedConsole) {
        let mut console = ScriptedConsole::new(inputs.iter().copied());
        let flow = self.manager.perform(action, &mut console).await.unwrap();
        (flow, console)
    }
}

// Configuration

#[test]
fn test_load_config_reads_saved_values() {
    let mut env = TestEnv::new();
    NodeConfig {
        wallet_address: Some("0xabc".to_string()),
        node_id: Some("777".to_string()),
    }
    .save(&env.manager.settings.config_path)
    .unwrap();

    let mut console = ScriptedConsole::default();
    env.manager.load_config(&mut console);

    assert_eq!(env.manager.config().wallet_address.as_deref(), Some("0xabc"));
    assert_eq!(env.manager.config().node_id.as_deref(), Some("777"));
    assert!(console.printed("Previous configuration loaded."));
}

#[test]
fn test_load_config_reports_malformed_file() {
    let mut env = TestEnv::new();
    fs::write(&env.manager.settings.config_path, "{ not json").unwrap();

    let mut console = ScriptedConsole::default();
    env.manager.load_config(&mut console);

    assert_eq!(env.manager.config(), &NodeConfig::default());
    assert!(console.printed("Failed to load configuration"));
}

#[test]
fn test_load_config_missing_file_is_silent() {
    let mut env = TestEnv::new();
    let mut console = ScriptedConsole::default();
    env.manager.load_config(&mut console);

    assert!(console.output.is_empty());
    assert_eq!(env.manager.config(), &NodeConfig::default());
}

// Setup

#[tokio::test]
async fn test_check_status_reports_each_tool() {
    let mut env = TestEnv::new();
    let (flow, console) = env.perform(Action::CheckStatus, &[]).await;

    assert_eq!(flow, Flow::Continue);
    assert!(console.printed("/usr/bin/screen"));
    assert!(console.printed("'rustc':"));
    assert!(console.printed("NOT FOUND"));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_tools_finds_rustc_installed_later() {
    let mut env = TestEnv::new();
    let (_, console) = env.perform(Action::CheckStatus, &[]).await;
    assert!(console.printed("NOT FOUND"));

    let cargo_bin = env.home().join(".cargo").join("bin");
    fs::create_dir_all(&cargo_bin).unwrap();
    let rustc = cargo_bin.join("rustc");
    fs::write(&rustc, "#!/bin/sh\nexit 0\n").unwrap();
    fs::set_permissions(&rustc, fs::Permissions::from_mode(0o755)).unwrap();

    env.manager.refresh_tools();
    assert_eq!(env.manager.paths().rustc.as_ref(), Some(&rustc));
    let (_, console) = env.perform(Action::CheckStatus, &[]).await;
    assert!(console.printed(&rustc.display().to_string()));
}

#[tokio::test]
async fn test_initial_setup_aborts_when_rustup_fails() {
    let mut env = TestEnv::new();
    env.mock.respond("sh.rustup.rs", 1, "");

    let (flow, console) = env.perform(Action::InitialSetup, &[]).await;

    assert_eq!(flow, Flow::Exit(1));
    assert!(env.mock.ran("sudo apt update && sudo apt upgrade -y"));
    assert!(env.mock.ran("sudo apt install screen curl build-essential pkg-config libssl-dev git-all -y"));
    assert!(env.mock.ran("sudo apt install protobuf-compiler -y"));
    assert!(!env.mock.ran("target add"));
    assert!(!env.mock.ran("cli.nexus.xyz"));
    assert!(console.printed("Rust installation failed"));
}

#[tokio::test]
async fn test_initial_setup_installs_everything_then_exits() {
    let mut env = TestEnv::new();
    let (flow, console) = env.perform(Action::InitialSetup, &[]).await;

    assert_eq!(flow, Flow::Exit(0));
    assert!(env.mock.ran("target add riscv32i-unknown-none-elf"));
    assert!(env.mock.ran("curl https://cli.nexus.xyz/ | sh"));
    assert!(console.printed("Initial setup complete"));

    let cargo_bin = env.home().join(".cargo").join("bin");
    let rustup = env
        .mock
        .specs()
        .into_iter()
        .find(|s| s.get_args().iter().any(|a| a == "target"))
        .unwrap();
    assert_eq!(rustup.program(), "rustup");
    let (key, value) = &rustup.get_envs()[0];
    assert_eq!(key, "PATH");
    assert!(value.starts_with(&cargo_bin.display().to_string()));
}

#[tokio::test]
async fn test_update_cli_refreshes_path() {
    let mut env = TestEnv::new().without_cli();
    let (_, console) = env.perform(Action::UpdateCli, &[]).await;

    assert!(env.mock.ran("cli.nexus.xyz"));
    assert!(env.manager.paths().nexus_cli.is_some());
    assert!(console.printed("Nexus CLI updated"));
}

#[tokio::test]
async fn test_update_cli_failure() {
    let mut env = TestEnv::new();
    env.mock.respond("cli.nexus.xyz", 1, "");
    let (_, console) = env.perform(Action::UpdateCli, &[]).await;

    assert!(console.printed("Nexus CLI update failed"));
}

// Registration

#[tokio::test]
async fn test_register_wallet_saves_on_success() {
    let mut env = TestEnv::new();
    let (_, console) = env.perform(Action::RegisterWallet, &["  0xWallet  "]).await;

    assert!(env.mock.ran("register-user --wallet-address 0xWallet"));
    assert_eq!(env.saved().wallet_address.as_deref(), Some("0xWallet"));
    assert!(console.printed("has been saved"));
}

#[tokio::test]
async fn test_register_wallet_failure_keeps_config() {
    let mut env = TestEnv::new();
    env.mock.respond("register-user", 2, "");
    let (_, console) = env.perform(Action::RegisterWallet, &["0xWallet"]).await;

    assert!(console.printed("exit code: 2"));
    assert!(console.printed("Wallet registration failed"));
    assert!(env.manager.config().wallet_address.is_none());
    assert!(!env.manager.settings().config_path.exists());
}

#[tokio::test]
async fn test_register_wallet_rejects_empty_address() {
    let mut env = TestEnv::new();
    let (_, console) = env.perform(Action::RegisterWallet, &["   "]).await;

    assert!(console.printed("Wallet address cannot be empty."));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_register_wallet_requires_cli() {
    let mut env = TestEnv::new().without_cli();
    let (_, console) = env.perform(Action::RegisterWallet, &["0xWallet"]).await;

    assert!(console.printed("'nexus-network' was not found"));
    assert!(env.mock.calls().is_empty());
    assert_eq!(console.remaining_inputs(), 1);
}

#[tokio::test]
async fn test_register_wallet_with_unexecutable_cli_keeps_menu_alive() {
    let temp_dir = TempDir::new().unwrap();
    let cli = temp_dir.path().join(NEXUS_CLI_NAME);
    fs::write(&cli, "not a program").unwrap();
    fs::set_permissions(&cli, fs::Permissions::from_mode(0o644)).unwrap();
    let paths = ToolPaths {
        screen: None,
        nexus_cli: Some(cli),
        rustc: None,
    };
    let mut manager = NodeManager::new(
        Settings::new(temp_dir.path()),
        paths,
        Arc::new(crate::runtime::ProcessExecutor::new()),
    );

    let mut console = ScriptedConsole::new(["0xWallet"]);
    let flow = manager
        .perform(Action::RegisterWallet, &mut console)
        .await
        .unwrap();

    assert_eq!(flow, Flow::Continue);
    assert!(console.printed("Command could not be started"));
    assert!(console.printed("exit code: 126"));
    assert!(console.printed("Wallet registration failed"));
    assert!(manager.config().wallet_address.is_none());
    assert!(!manager.settings().config_path.exists());
}

#[tokio::test]
async fn test_register_node_saves_extracted_id() {
    let mut env = TestEnv::new();
    env.mock.respond(
        "register-node",
        0,
        "\x1b[32mNode registered successfully with ID: 6523418\x1b[0m\n",
    );
    let (_, console) = env.perform(Action::RegisterNode, &[]).await;

    assert_eq!(env.saved().node_id.as_deref(), Some("6523418"));
    assert!(console.printed("Node ID created and saved: 6523418"));
}

#[tokio::test]
async fn test_register_node_without_id_leaves_state() {
    let mut env = TestEnv::new().with_node_id("old-id");
    env.mock.respond("register-node", 0, "Registration pending\n");
    let (_, console) = env.perform(Action::RegisterNode, &[]).await;

    assert!(console.printed("Could not find a node ID"));
    assert_eq!(env.manager.config().node_id.as_deref(), Some("old-id"));
    assert!(!env.manager.settings().config_path.exists());
}

#[tokio::test]
async fn test_register_node_failure_reports_code() {
    let mut env = TestEnv::new();
    env.mock.respond("register-node", 3, "Successfully registered node with ID: 99\n");
    let (_, console) = env.perform(Action::RegisterNode, &[]).await;

    assert!(console.printed("Exit code: 3"));
    assert!(env.manager.config().node_id.is_none());
}

// Starting nodes

#[tokio::test]
async fn test_start_foreground_with_saved_id() {
    let mut env = TestEnv::new().with_node_id("node-7");
    let (flow, console) = env
        .perform(Action::StartNode(RunMode::Foreground), &[""])
        .await;

    assert_eq!(flow, Flow::Continue);
    assert!(env.mock.ran("nexus-network start --node-id node-7"));
    assert!(!env.mock.ran("screen"));
    assert!(console.printed("CTRL+C"));
}

#[tokio::test]
async fn test_start_foreground_with_new_id() {
    let mut env = TestEnv::new().with_node_id("node-7");
    env.perform(Action::StartNode(RunMode::Foreground), &["n", "node-8"])
        .await;

    assert!(env.mock.ran("start --node-id node-8"));
    assert!(!env.mock.ran("node-7"));
}

#[tokio::test]
async fn test_start_rejects_empty_node_id() {
    let mut env = TestEnv::new();
    let (_, console) = env
        .perform(Action::StartNode(RunMode::Foreground), &[""])
        .await;

    assert!(console.printed("No node ID saved yet"));
    assert!(console.printed("Node ID cannot be empty."));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_start_background_in_named_session() {
    let mut env = TestEnv::new().with_node_id("node-7");
    let (_, console) = env
        .perform(Action::StartNode(RunMode::Background), &["y", "mynode"])
        .await;

    let calls = env.mock.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("/usr/bin/screen -S mynode -dm bash -c"));
    assert!(calls[0].contains("start --node-id node-7"));
    assert!(console.printed("screen session 'mynode'"));
}

#[tokio::test]
async fn test_start_background_default_session_name() {
    let mut env = TestEnv::new().with_node_id("node-7");
    env.perform(Action::StartNode(RunMode::Background), &["", ""])
        .await;

    assert!(env.mock.ran("/usr/bin/screen -S nexus-"));
    assert!(!env.mock.ran("nexus-prover-"));
}

#[tokio::test]
async fn test_start_background_rejects_bad_session_name() {
    let mut env = TestEnv::new().with_node_id("node-7");
    let (_, console) = env
        .perform(Action::StartNode(RunMode::Background), &["", "my node"])
        .await;

    assert!(console.printed("may not contain spaces"));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_start_background_requires_screen() {
    let mut env = TestEnv::new().with_node_id("node-7").without_screen();
    let (_, console) = env
        .perform(Action::StartNode(RunMode::Background), &["", ""])
        .await;

    assert!(console.printed("'screen' was not found"));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_start_max_threads_default() {
    let mut env = TestEnv::new().with_node_id("node-7");
    env.perform(
        Action::StartNode(RunMode::BackgroundMaxThreads),
        &["", "", ""],
    )
    .await;

    assert!(env.mock.ran("/usr/bin/screen -S nexus-prover-"));
    assert!(env.mock.ran("start --node-id node-7 --max-threads 4"));
}

#[tokio::test]
async fn test_start_max_threads_custom() {
    let mut env = TestEnv::new().with_node_id("node-7");
    env.perform(
        Action::StartNode(RunMode::BackgroundMaxThreads),
        &["", "8", "prover1"],
    )
    .await;

    assert!(env.mock.ran("/usr/bin/screen -S prover1 -dm"));
    assert!(env.mock.ran("--max-threads 8"));
}

#[tokio::test]
async fn test_start_max_threads_rejects_zero() {
    let mut env = TestEnv::new().with_node_id("node-7");
    let (_, console) = env
        .perform(Action::StartNode(RunMode::BackgroundMaxThreads), &["", "0"])
        .await;

    assert!(console.printed("Thread count must be a positive number."));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_start_local_glibc() {
    let mut env = TestEnv::new().with_node_id("node-7");
    let (_, console) = env
        .perform(Action::StartNode(RunMode::LocalGlibc), &[""])
        .await;

    if Path::new(GLIBC_PREFIX).join("lib").join("ld-linux-x86-64.so.2").exists() {
        assert!(env.mock.ran("ld-linux-x86-64.so.2 --library-path"));
        assert!(env.mock.ran("nexus-network start --node-id node-7"));
    } else {
        assert!(console.printed("was not found. Run 'Update GLIBC'"));
        assert!(env.mock.calls().is_empty());
    }
}

// Sessions

#[tokio::test]
async fn test_view_sessions_attaches_to_choice() {
    let mut env = TestEnv::new();
    env.mock.respond(" -ls", 0, LS_OUTPUT);
    let (_, console) = env.perform(Action::ViewSessions, &["2", ""]).await;

    assert!(console.printed("1. "));
    assert!(console.printed("12345.nexus-512"));
    assert!(env.mock.ran("/usr/bin/screen -r 23456.nexus-prover-204"));
    assert_eq!(console.clears, 1);
    assert_eq!(console.remaining_inputs(), 0);
}

#[tokio::test]
async fn test_view_sessions_back() {
    let mut env = TestEnv::new();
    env.mock.respond(" -ls", 0, LS_OUTPUT);
    let (_, console) = env.perform(Action::ViewSessions, &["x"]).await;

    assert!(!env.mock.ran(" -r "));
    assert!(!console.printed("Invalid"));
}

#[tokio::test]
async fn test_view_sessions_none_running() {
    let mut env = TestEnv::new();
    env.mock
        .respond(" -ls", 1, "No Sockets found in /run/screen/S-root.\n");
    let (_, console) = env.perform(Action::ViewSessions, &[]).await;

    assert!(console.printed("No screen sessions are running."));
    assert!(console.prompts.is_empty());
}

#[tokio::test]
async fn test_stop_session_sends_quit() {
    let mut env = TestEnv::new();
    env.mock.respond(" -ls", 0, LS_OUTPUT);
    let (_, console) = env.perform(Action::StopSession, &["1"]).await;

    assert!(env.mock.ran("/usr/bin/screen -X -S 12345.nexus-512 quit"));
    assert!(console.printed("Session '12345.nexus-512' has been stopped."));
}

#[tokio::test]
async fn test_stop_session_invalid_choice() {
    let mut env = TestEnv::new();
    env.mock.respond(" -ls", 0, LS_OUTPUT);
    let (_, console) = env.perform(Action::StopSession, &["5"]).await;

    assert!(console.printed("Invalid choice."));
    assert!(!env.mock.ran("quit"));
}

#[tokio::test]
async fn test_list_sessions_without_screen_is_empty() {
    let env = TestEnv::new().without_screen();
    assert!(env.manager.list_sessions().await.unwrap().is_empty());
    assert!(env.mock.calls().is_empty());
}

// System utilities

#[tokio::test]
async fn test_check_glibc_prints_version() {
    let mut env = TestEnv::new();
    env.mock.respond("ldd --version", 0, LDD_2_35);
    let (flow, console) = env.perform(Action::CheckGlibc, &[]).await;

    assert_eq!(flow, Flow::Continue);
    assert!(console.printed("Current GLIBC version"));
    assert!(console.printed("2.35"));
}

#[tokio::test]
async fn test_check_glibc_unrecognized_output() {
    let mut env = TestEnv::new();
    env.mock.respond("ldd --version", 0, "musl libc\n");
    let (_, console) = env.perform(Action::CheckGlibc, &[]).await;

    assert!(console.printed("Could not determine the GLIBC version."));
}

#[tokio::test]
async fn test_update_glibc_only_on_2_35() {
    let mut env = TestEnv::new();
    env.mock.respond("ldd --version", 0, LDD_2_39);
    let (_, console) = env.perform(Action::UpdateGlibc, &["AGREE"]).await;

    assert!(console.printed("only offered on version 2.35"));
    assert_eq!(env.mock.calls().len(), 1);
    assert_eq!(console.remaining_inputs(), 1);
}

#[tokio::test]
async fn test_update_glibc_requires_agreement() {
    let mut env = TestEnv::new();
    env.mock.respond("ldd --version", 0, LDD_2_35);
    let (_, console) = env.perform(Action::UpdateGlibc, &["yes"]).await;

    assert!(console.printed("GLIBC update cancelled."));
    assert!(!env.mock.ran("apt"));
}

#[tokio::test]
async fn test_update_glibc_builds_from_home() {
    let mut env = TestEnv::new();
    env.mock.respond("ldd --version", 0, LDD_2_35);
    let (_, console) = env.perform(Action::UpdateGlibc, &["agree"]).await;

    assert!(env.mock.ran("sudo apt install -y gawk bison gcc make wget tar"));
    assert!(env
        .mock
        .ran("wget -c https://ftp.gnu.org/gnu/glibc/glibc-2.39.tar.gz"));
    assert!(env.mock.ran("../configure --prefix=/opt/glibc-2.39"));
    assert!(env.mock.ran("rm -rf glibc-2.39 glibc-2.39.tar.gz"));
    assert!(console.printed("reboot is recommended"));

    let wget = env
        .mock
        .specs()
        .into_iter()
        .find(|s| s.program() == "wget")
        .unwrap();
    assert_eq!(wget.get_current_dir().map(|p| p.as_path()), Some(env.home()));
}

#[tokio::test]
async fn test_update_glibc_build_failure_skips_cleanup() {
    let mut env = TestEnv::new();
    env.mock.respond("ldd --version", 0, LDD_2_35);
    env.mock.respond("configure", 2, "");
    let (_, console) = env.perform(Action::UpdateGlibc, &["AGREE"]).await;

    assert!(console.printed("GLIBC update failed"));
    assert!(!env.mock.ran("rm -rf"));
}

#[tokio::test]
async fn test_create_swap_runs_all_steps() {
    let mut env = TestEnv::new();
    let (_, console) = env.perform(Action::CreateSwap, &["2", "y"]).await;

    let calls = env.mock.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[0], "sudo fallocate -l 8G /swapfile");
    assert!(calls[4].contains("tee -a /etc/fstab"));
    assert!(console.printed("8G swap file created"));
}

#[tokio::test]
async fn test_create_swap_stops_at_failure() {
    let mut env = TestEnv::new();
    env.mock.respond("chmod", 1, "");
    let (_, console) = env.perform(Action::CreateSwap, &["1", "y"]).await;

    assert!(env.mock.ran("fallocate -l 4G"));
    assert!(!env.mock.ran("mkswap"));
    assert!(!env.mock.ran("fstab"));
    assert!(console.printed("Swap creation stopped"));
}

#[tokio::test]
async fn test_create_swap_invalid_choice() {
    let mut env = TestEnv::new();
    let (_, console) = env.perform(Action::CreateSwap, &["7"]).await;

    assert!(console.printed("Invalid choice."));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_create_swap_declined() {
    let mut env = TestEnv::new();
    let (_, console) = env.perform(Action::CreateSwap, &["3", ""]).await;

    assert!(console.printed("Swap creation cancelled."));
    assert!(env.mock.calls().is_empty());
}

#[tokio::test]
async fn test_reboot_requires_confirmation() {
    let mut env = TestEnv::new();
    env.perform(Action::Reboot, &["n"]).await;
    assert!(env.mock.calls().is_empty());

    env.perform(Action::Reboot, &["y"]).await;
    assert_eq!(env.mock.calls(), vec!["sudo reboot".to_string()]);
}

#[tokio::test]
async fn test_exit_action() {
    let mut env = TestEnv::new();
    let (flow, console) = env.perform(Action::Exit, &[]).await;

    assert_eq!(flow, Flow::Exit(0));
    assert!(console.printed("Goodbye"));
}

#[tokio::test]
async fn test_closed_input_propagates() {
    let mut env = TestEnv::new();
    let mut console = ScriptedConsole::default();
    let err = env
        .manager
        .perform(Action::RegisterWallet, &mut console)
        .await
        .unwrap_err();

    assert!(matches!(err, crate::cli::error::InteractiveError::InputClosed));
}
