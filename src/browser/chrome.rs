//! Chromium-backed page surface
//!
//! Drives a real browser over the DevTools protocol. DOM reads and form
//! writes are evaluated as small scripts that resolve the selector afresh
//! each time; key presses and pointer clicks go through CDP input events.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::layout::Point;
use chromiumoxide::page::Page;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::task::JoinHandle;

use crate::common::config::Config;
use crate::common::{Error, Result};

use super::{Key, PageSurface};

/// Browser instance with its background CDP event handler
pub struct ChromeBrowser {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromeBrowser {
    /// Launch Chromium using the `[browser]` settings
    pub async fn launch(config: &Config) -> Result<Self> {
        let executable = config.browser_executable()?;
        let (width, height) = config.browser.window_size;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .window_size(width, height)
            .request_timeout(config.timeouts.navigation())
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-sync");

        if !config.browser.headless {
            builder = builder.with_head();
        }
        if config.browser.no_sandbox {
            builder = builder.no_sandbox();
        }

        let browser_config = builder
            .build()
            .map_err(|e| Error::Browser(format!("Browser config error: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Browser event error: {:?}", e);
                }
            }
        });

        tracing::debug!("Browser launched");
        Ok(Self { browser, handler })
    }

    /// Open a new tab and navigate it to `url`
    pub async fn open(&self, url: &str, navigation_timeout: Duration) -> Result<ChromePage> {
        let page = self.browser.new_page("about:blank").await?;

        tracing::info!(url, "Navigating");
        match tokio::time::timeout(navigation_timeout, page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(Error::Browser(format!("Navigation to {} failed: {}", url, e)));
            }
            Err(_) => {
                return Err(Error::Browser(format!(
                    "Navigation to {} timed out after {} s",
                    url,
                    navigation_timeout.as_secs()
                )));
            }
        }

        match tokio::time::timeout(navigation_timeout, page.wait_for_navigation()).await {
            Ok(Ok(_)) => Ok(ChromePage { page }),
            Ok(Err(e)) => Err(Error::Browser(format!(
                "Waiting for {} to load failed: {}",
                url, e
            ))),
            Err(_) => Err(Error::Browser(format!(
                "Page load of {} timed out after {} s",
                url,
                navigation_timeout.as_secs()
            ))),
        }
    }

    /// Close the browser and stop the event handler
    pub async fn close(mut self) -> Result<()> {
        let result = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
        result.map(|_| ()).map_err(Error::from)
    }
}

/// A single tab of the system under test
#[derive(Clone)]
pub struct ChromePage {
    page: Page,
}

#[derive(Deserialize)]
struct Found {
    found: bool,
}

#[derive(Deserialize)]
struct Count {
    count: usize,
}

#[derive(Deserialize)]
struct Visible {
    visible: bool,
}

#[derive(Deserialize)]
struct FieldValue {
    found: bool,
    value: Option<String>,
}

#[derive(Deserialize)]
struct TextContent {
    found: bool,
    text: Option<String>,
}

/// Encode a Rust string as a JS string literal
fn js_str(value: &str) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

impl ChromePage {
    /// Evaluate `script` in the page and deserialize its (object) result
    async fn eval<T: DeserializeOwned>(&self, script: String) -> Result<T> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .await_promise(true)
            .build()
            .map_err(|e| Error::Browser(format!("Invalid evaluate params: {}", e)))?;

        let result = self.page.evaluate_expression(params).await?;
        result
            .into_value::<T>()
            .map_err(|e| Error::Browser(format!("Unexpected script result: {}", e)))
    }

    /// Run a script against the first match, failing when nothing matches
    async fn with_first(&self, selector: &str, body: &str) -> Result<()> {
        let script = format!(
            "(() => {{ const el = document.querySelector({sel}); \
             if (!el) return {{ found: false }}; {body} return {{ found: true }}; }})()",
            sel = js_str(selector)?,
            body = body,
        );
        let found: Found = self.eval(script).await?;
        if found.found {
            Ok(())
        } else {
            Err(Error::element_not_found(selector, 0))
        }
    }
}

#[async_trait]
impl PageSurface for ChromePage {
    async fn count(&self, selector: &str) -> Result<usize> {
        let script = format!(
            "(() => ({{ count: document.querySelectorAll({}).length }}))()",
            js_str(selector)?
        );
        let count: Count = self.eval(script).await?;
        Ok(count.count)
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        self.with_first(selector, "el.focus();").await
    }

    async fn fill(&self, selector: &str, text: &str) -> Result<()> {
        // Frameworks track the native value setter, so plain assignment is not enough
        let body = format!(
            "el.focus(); \
             const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype : HTMLInputElement.prototype; \
             Object.getOwnPropertyDescriptor(proto, 'value').set.call(el, {value}); \
             el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
             el.dispatchEvent(new Event('change', {{ bubbles: true }}));",
            value = js_str(text)?
        );
        self.with_first(selector, &body).await
    }

    async fn press(&self, selector: &str, key: Key) -> Result<()> {
        match key {
            // Selected through the DOM; Control+A chords vary by platform
            Key::SelectAll => {
                self.with_first(selector, "el.focus(); if (el.select) el.select();")
                    .await
            }
            Key::Escape | Key::Backspace => {
                let element = self
                    .page
                    .find_element(selector)
                    .await
                    .map_err(|_| Error::element_not_found(selector, 0))?;
                element.press_key(key.name()).await?;
                Ok(())
            }
        }
    }

    async fn click_at(&self, x: f64, y: f64) -> Result<()> {
        self.page.click(Point::new(x, y)).await?;
        Ok(())
    }

    async fn click_by_role(&self, role: &str, name_pattern: &str) -> Result<()> {
        let script = format!(
            "(() => {{ \
               const role = {role}; const re = new RegExp({pattern}, 'i'); \
               let sel = '[role=\"' + role + '\"]'; \
               if (role === 'button') sel += ', button, input[type=button], input[type=submit], input[type=reset]'; \
               const nameOf = (el) => (el.getAttribute('aria-label') || el.innerText || el.value || el.title || '').trim(); \
               for (const el of document.querySelectorAll(sel)) {{ \
                 if (re.test(nameOf(el))) {{ el.click(); return {{ found: true }}; }} \
               }} \
               return {{ found: false }}; \
             }})()",
            role = js_str(role)?,
            pattern = js_str(name_pattern)?,
        );
        let found: Found = self.eval(script).await?;
        if found.found {
            Ok(())
        } else {
            Err(Error::element_not_found(
                &format!("role={}[name=/{}/i]", role, name_pattern),
                0,
            ))
        }
    }

    async fn input_value(&self, selector: &str) -> Result<String> {
        let script = format!(
            "(() => {{ const el = document.querySelector({}); \
             return el ? {{ found: true, value: el.value }} : {{ found: false }}; }})()",
            js_str(selector)?
        );
        let field: FieldValue = self.eval(script).await?;
        if !field.found {
            return Err(Error::element_not_found(selector, 0));
        }
        Ok(field.value.unwrap_or_default())
    }

    async fn is_visible(&self, selector: &str, index: usize) -> Result<bool> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({sel})[{index}]; \
             if (!el) return {{ visible: false }}; \
             const style = getComputedStyle(el); const rect = el.getBoundingClientRect(); \
             return {{ visible: style.visibility !== 'hidden' && style.display !== 'none' \
                       && (rect.width > 0 || rect.height > 0) }}; }})()",
            sel = js_str(selector)?,
            index = index,
        );
        let visible: Visible = self.eval(script).await?;
        Ok(visible.visible)
    }

    async fn text_content(&self, selector: &str, index: usize) -> Result<Option<String>> {
        let script = format!(
            "(() => {{ const el = document.querySelectorAll({sel})[{index}]; \
             return el ? {{ found: true, text: el.textContent }} : {{ found: false }}; }})()",
            sel = js_str(selector)?,
            index = index,
        );
        let content: TextContent = self.eval(script).await?;
        if !content.found {
            return Err(Error::element_not_found(selector, index));
        }
        Ok(content.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_str_escapes_quotes_and_unicode() {
        assert_eq!(js_str("a\"b").unwrap(), r#""a\"b""#);
        assert_eq!(js_str("ඔයා").unwrap(), "\"ඔයා\"");
        assert_eq!(js_str(".w-full.h-80").unwrap(), "\".w-full.h-80\"");
    }
}
