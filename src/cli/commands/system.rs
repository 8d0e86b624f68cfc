use super::NodeManager;
use crate::cli::console::{confirm, Console};
use crate::cli::error::Result;
use crate::cli::output::{banner, paint, OutputStyle};
use crate::core::parse_glibc_version;
use crate::runtime::CommandSpec;
use tracing::{info, warn};

/// Install prefix of the locally built GLIBC
pub const GLIBC_PREFIX: &str = "/opt/glibc-2.39";

/// Version built by `update_glibc`
pub const GLIBC_TARGET_VERSION: &str = "2.39";

/// The only system version the upgrade is offered for (Ubuntu 22.04)
pub const GLIBC_UPGRADABLE_VERSION: &str = "2.35";

/// Dynamic loader of the local GLIBC
pub const GLIBC_LOADER: &str = "/opt/glibc-2.39/lib/ld-linux-x86-64.so.2";

/// Library search path handed to the local loader
pub const GLIBC_LIBRARY_PATH: &str =
    "/opt/glibc-2.39/lib:/lib/x86_64-linux-gnu:/usr/lib/x86_64-linux-gnu";

const GLIBC_SOURCE_URL: &str = "https://ftp.gnu.org/gnu/glibc/glibc-2.39.tar.gz";
const GLIBC_SOURCE_DIR: &str = "glibc-2.39";
const GLIBC_TARBALL: &str = "glibc-2.39.tar.gz";
const GLIBC_BUILD_PACKAGES: &[&str] = &["gawk", "bison", "gcc", "make", "wget", "tar"];

pub const SWAP_FILE: &str = "/swapfile";

/// Swap sizes offered by the menu, by choice number
const SWAP_SIZES: &[(&str, &str)] = &[("1", "4G"), ("2", "8G"), ("3", "16G")];

/// Swap size for a menu choice
pub fn swap_size_for(choice: &str) -> Option<&'static str> {
    let choice = choice.trim();
    SWAP_SIZES
        .iter()
        .find(|(key, _)| *key == choice)
        .map(|(_, size)| *size)
}

/// Steps that create, enable and persist a swap file of `size`
pub fn swap_steps(size: &str) -> Vec<CommandSpec> {
    vec![
        CommandSpec::new("sudo").args(["fallocate", "-l", size, SWAP_FILE]),
        CommandSpec::new("sudo").args(["chmod", "600", SWAP_FILE]),
        CommandSpec::new("sudo").args(["mkswap", SWAP_FILE]),
        CommandSpec::new("sudo").args(["swapon", SWAP_FILE]),
        CommandSpec::shell(format!(
            "echo '{} none swap sw 0 0' | sudo tee -a /etc/fstab",
            SWAP_FILE
        )),
    ]
}

/// Shell script that configures, builds and installs GLIBC from the
/// unpacked sources in the current directory
fn glibc_build_script() -> String {
    format!(
        "tar -xvzf {tarball} && cd {dir} && mkdir -p glibc-build && cd glibc-build \
         && ../configure --prefix={prefix} && make -j$(nproc) && sudo make install",
        tarball = GLIBC_TARBALL,
        dir = GLIBC_SOURCE_DIR,
        prefix = GLIBC_PREFIX,
    )
}

impl NodeManager {
    /// Detect and print the system GLIBC version
    pub(super) async fn check_glibc(&mut self, console: &mut dyn Console) -> Result<Option<String>> {
        console.say(&paint(OutputStyle::Heading, "🔎 Checking GLIBC version...\n"));
        let output = self
            .runner
            .capture_quiet(&CommandSpec::new("ldd").arg("--version"))
            .await?;

        let version = parse_glibc_version(&output.combined());
        match &version {
            Some(version) => console.say(&format!(
                "Current GLIBC version: {}",
                paint(OutputStyle::Success, version)
            )),
            None => {
                warn!("Unrecognized ldd output: {}", output.combined().trim());
                console.say(&paint(
                    OutputStyle::Failure,
                    "Could not determine the GLIBC version.",
                ));
            }
        }
        Ok(version)
    }

    /// Build GLIBC 2.39 from source into `/opt/glibc-2.39`
    pub(super) async fn update_glibc(&mut self, console: &mut dyn Console) -> Result<()> {
        let Some(version) = self.check_glibc(console).await? else {
            return Ok(());
        };
        if version != GLIBC_UPGRADABLE_VERSION {
            console.say(&paint(
                OutputStyle::Highlight,
                &format!(
                    "The GLIBC upgrade is only offered on version {}. Nothing to do.\n",
                    GLIBC_UPGRADABLE_VERSION
                ),
            ));
            return Ok(());
        }

        console.say(&paint(OutputStyle::Warning, &banner("WARNING")));
        console.say(&paint(
            OutputStyle::Warning,
            &format!(
                "GLIBC {} will be compiled from source and installed into {}.\n\
                 The build takes a long time and uses a lot of CPU and memory.\n\
                 The system GLIBC is left untouched, but a failed build can leave\n\
                 partial files behind. Continue at your own risk.",
                GLIBC_TARGET_VERSION, GLIBC_PREFIX
            ),
        ));
        let answer = console.read_line("Type 'AGREE' to continue: ")?;
        if !answer.trim().eq_ignore_ascii_case("AGREE") {
            console.say(&paint(OutputStyle::Highlight, "GLIBC update cancelled.\n"));
            return Ok(());
        }
        info!("Building GLIBC {}", GLIBC_TARGET_VERSION);

        let home = self.settings.user_home.clone();
        let steps = [
            CommandSpec::new("sudo").args(["apt", "update"]),
            CommandSpec::new("sudo")
                .args(["apt", "install", "-y"])
                .args(GLIBC_BUILD_PACKAGES.iter().copied()),
            CommandSpec::new("wget")
                .args(["-c", GLIBC_SOURCE_URL])
                .current_dir(&home),
            CommandSpec::shell(glibc_build_script()).current_dir(&home),
        ];
        if !self.runner.run_all(console, &steps).await? {
            console.say(&paint(
                OutputStyle::Failure,
                "✖ GLIBC update failed. See the output above.\n",
            ));
            return Ok(());
        }

        let cleanup = CommandSpec::new("rm")
            .args(["-rf", GLIBC_SOURCE_DIR, GLIBC_TARBALL])
            .current_dir(&home);
        self.runner.run(console, &cleanup).await?;

        console.say(&paint(
            OutputStyle::Success,
            &format!("✅ GLIBC {} installed into {}.", GLIBC_TARGET_VERSION, GLIBC_PREFIX),
        ));
        console.say(&paint(
            OutputStyle::Highlight,
            "A reboot is recommended. Start the node with 'Run node with local GLIBC'.\n",
        ));
        Ok(())
    }

    pub(super) async fn create_swap(&mut self, console: &mut dyn Console) -> Result<()> {
        console.say(&paint(OutputStyle::Heading, "💾 Create a swap file\n"));
        console.say("1. 4G\n2. 8G\n3. 16G");

        let choice = console.read_line("Choose a swap size: ")?;
        let Some(size) = swap_size_for(&choice) else {
            console.say(&paint(OutputStyle::Failure, "Invalid choice.\n"));
            return Ok(());
        };

        let prompt = format!("Create a {} swap file at {}? (y/N): ", size, SWAP_FILE);
        if !confirm(console, &prompt, false)? {
            console.say(&paint(OutputStyle::Highlight, "Swap creation cancelled.\n"));
            return Ok(());
        }

        if self.runner.run_all(console, &swap_steps(size)).await? {
            info!("Created {} swap file", size);
            console.say(&paint(
                OutputStyle::Success,
                &format!("✅ {} swap file created and enabled.\n", size),
            ));
        } else {
            console.say(&paint(
                OutputStyle::Failure,
                "✖ Swap creation stopped at the failed step above.\n",
            ));
        }
        Ok(())
    }

    pub(super) async fn reboot(&mut self, console: &mut dyn Console) -> Result<()> {
        if !confirm(console, "Reboot the system now? (y/N): ", false)? {
            console.say(&paint(OutputStyle::Highlight, "Reboot cancelled.\n"));
            return Ok(());
        }
        console.say(&paint(OutputStyle::Warning, "Rebooting...\n"));
        self.runner
            .run(console, &CommandSpec::new("sudo").arg("reboot"))
            .await?;
        Ok(())
    }
}
