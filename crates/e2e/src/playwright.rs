//! Playwright browser automation
//!
//! A small node program is written to a temp dir and started once per
//! scenario. It keeps one browser page open and executes [`Action`]s read as
//! JSON lines from stdin, answering each with one JSON line on stdout. Each
//! command carries an id that its reply echoes, so a reply that arrives after
//! its command timed out is skipped rather than taken for the next one.
//! Waiting is left to Playwright's own auto-wait and `expect` polling.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use tempfile::TempDir;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use ftts_common::config::{BrowserConfig, MAX_TIMEOUT_MS};

use crate::action::{Action, Reply};
use crate::driver::{Driver, DriverFactory};
use crate::error::{E2eError, E2eResult};

/// Extra time allowed for a reply beyond the action's own wait
const REPLY_SLACK: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Unknown names fall back to Chromium
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// `node_modules` holding `@playwright/test`; defaults to the working directory's
    pub node_modules: Option<PathBuf>,
    pub startup_timeout: Duration,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_modules: None,
            startup_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&BrowserConfig> for PlaywrightConfig {
    fn from(browser: &BrowserConfig) -> Self {
        Self {
            browser: Browser::from_name(&browser.name),
            headless: browser.headless,
            viewport_width: browser.viewport_width,
            viewport_height: browser.viewport_height,
            ..Default::default()
        }
    }
}

/// Build the node program that serves the JSON-lines protocol
pub fn build_driver_script(config: &PlaywrightConfig) -> String {
    let mut script = format!(
        r#"
const {{ chromium, firefox, webkit, expect }} = require('@playwright/test');
const readline = require('readline');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
  const input = readline.createInterface({{ input: process.stdin }});

  reply({{ id: 0, ok: true, value: 'ready' }});
  for await (const line of input) {{
    let cmd;
    try {{
      cmd = JSON.parse(line);
    }} catch (error) {{
      reply({{ ok: false, error: 'bad command: ' + error.message }});
      continue;
    }}
    if (cmd.action === 'close') {{
      reply({{ id: cmd.id, ok: true, value: null }});
      break;
    }}
    try {{
      const value = await perform(page, context, cmd);
      reply({{ id: cmd.id, ok: true, value: value === undefined ? null : value }});
    }} catch (error) {{
      reply({{ id: cmd.id, ok: false, error: String(error.message).split('\n')[0] }});
    }}
  }}
  await browser.close();
}})();
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
    );

    script.push_str(
        r#"
async function perform(page, context, cmd) {
  const nth = () => page.locator(cmd.selector).nth(cmd.index);
  const opts = { timeout: cmd.timeout_ms };
  switch (cmd.action) {
    case 'navigate':
      await page.goto(cmd.url);
      return null;
    case 'click':
      await nth().click(opts);
      return null;
    case 'fill':
      await nth().fill(cmd.value, opts);
      return null;
    case 'select':
      await nth().selectOption(cmd.value, opts);
      return null;
    case 'check':
      await nth().check(opts);
      return null;
    case 'text':
      return (await nth().innerText(opts)).trim();
    case 'count':
      return await page.locator(cmd.selector).count();
    case 'expect': {
      const c = cmd.condition;
      switch (c.kind) {
        case 'visible': await expect(nth()).toBeVisible(opts); break;
        case 'hidden': await expect(nth()).toBeHidden(opts); break;
        case 'text': await expect(nth()).toHaveText(c.expected, opts); break;
        case 'contains_text': await expect(nth()).toContainText(c.expected, opts); break;
        default: throw new Error('unknown condition ' + c.kind);
      }
      return null;
    }
    case 'url':
      return page.url();
    case 'set_cookie':
      await context.addCookies([{ name: cmd.name, value: cmd.value, url: cmd.url }]);
      return null;
    case 'screenshot':
      await page.screenshot({ path: cmd.path, fullPage: true });
      return null;
    default:
      throw new Error('unknown action ' + cmd.action);
  }
}
"#,
    );

    script
}

/// Playwright browser session
pub struct PlaywrightDriver {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    last_id: u64,
    // Holds the driver script for the lifetime of the process
    _script_dir: TempDir,
}

impl PlaywrightDriver {
    /// Start node, launch the browser and wait for its ready line
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, build_driver_script(config))?;

        let node_modules = match &config.node_modules {
            Some(path) => path.clone(),
            None => std::env::current_dir()?.join("node_modules"),
        };

        debug!("Starting Playwright driver: {}", script_path.display());
        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_modules)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("driver stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    debug!(target: "playwright", "{}", line);
                }
            });
        }

        let mut driver = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            last_id: 0,
            _script_dir: script_dir,
        };

        let ready = read_reply(&mut driver.stdout, 0, config.startup_timeout, "browser launch").await?;
        if !ready.ok {
            return Err(E2eError::Playwright(
                ready.error.unwrap_or_else(|| "browser failed to launch".to_string()),
            ));
        }

        info!("{} session started", config.browser.as_str());
        Ok(driver)
    }
}

/// Wait for the reply to command `id`
async fn read_reply<R>(lines: &mut Lines<R>, id: u64, wait: Duration, what: &str) -> E2eResult<Reply>
where
    R: AsyncBufRead + Unpin,
{
    timeout(wait, next_reply(lines, id, what))
        .await
        .map_err(|_| E2eError::Timeout(what.to_string()))?
}

async fn next_reply<R>(lines: &mut Lines<R>, id: u64, what: &str) -> E2eResult<Reply>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let Some(line) = lines.next_line().await? else {
            return Err(E2eError::Playwright(format!("driver exited during {}", what)));
        };
        let reply: Reply = serde_json::from_str(&line)?;
        match reply.id {
            Some(reply_id) if reply_id != id => {
                debug!(reply_id, expected = id, "Skipping late driver reply");
            }
            _ => return Ok(reply),
        }
    }
}

/// Check if Playwright is installed
fn check_playwright_installed() -> E2eResult<()> {
    let output = Command::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// Time to wait for a reply to `action`
fn reply_timeout(action: &Action) -> Duration {
    let wait_ms = match action.target() {
        Some((_, _, timeout_ms)) if timeout_ms > 0 => timeout_ms,
        Some(_) => 0,
        None => MAX_TIMEOUT_MS,
    };
    Duration::from_millis(wait_ms) + REPLY_SLACK
}

#[async_trait]
impl Driver for PlaywrightDriver {
    async fn perform(&mut self, action: &Action) -> E2eResult<Value> {
        self.last_id += 1;
        let id = self.last_id;
        let mut command = serde_json::to_value(action)?;
        if let Value::Object(fields) = &mut command {
            fields.insert("id".to_string(), Value::from(id));
        }
        let mut line = command.to_string();
        line.push('\n');
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let reply = read_reply(&mut self.stdout, id, reply_timeout(action), &action.name()).await?;
        if reply.ok {
            Ok(reply.value)
        } else {
            Err(E2eError::Driver(
                reply.error.unwrap_or_else(|| "unknown driver error".to_string()),
            ))
        }
    }

    async fn close(&mut self) -> E2eResult<()> {
        if let Err(e) = self.perform(&Action::Close).await {
            warn!("Driver did not close cleanly: {}", e);
        }
        match timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(status) => {
                debug!("Driver exited: {:?}", status?);
            }
            Err(_) => {
                warn!("Driver did not exit, killing");
                self.child.kill().await?;
            }
        }
        Ok(())
    }
}

/// Launches one [`PlaywrightDriver`] per scenario
pub struct PlaywrightFactory {
    config: PlaywrightConfig,
}

impl PlaywrightFactory {
    pub fn new(config: PlaywrightConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DriverFactory for PlaywrightFactory {
    async fn launch(&self) -> E2eResult<Box<dyn Driver>> {
        let driver = PlaywrightDriver::launch(&self.config).await?;
        Ok(Box::new(driver))
    }
}
