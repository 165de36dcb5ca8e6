//! Shared fixtures for the crawl tests: an in-memory page driver and sample pages.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

use acordaos::scrapers::navigator::{HELP_OVERLAY_SELECTOR, OVERLAY_CLOSE_SELECTOR};
use acordaos::scrapers::{ElementState, LookupError, NavigatorOptions, PageDriver};

pub const TABLE: &str = "download_acordaos";

/// What the navigator did to the fake browser.
#[derive(Debug, Default)]
pub struct DriverLog {
    pub visits: Vec<String>,
    pub clicks: Vec<String>,
    pub closed: bool,
}

/// Serves canned HTML per URL. Selectors listed in `hidden` are attached
/// but not rendered until the next navigation.
pub struct FakeDriver {
    pages: HashMap<String, String>,
    current: Option<String>,
    hidden: HashSet<String>,
    log: Arc<Mutex<DriverLog>>,
}

impl FakeDriver {
    pub fn new() -> (Self, Arc<Mutex<DriverLog>>) {
        let log = Arc::new(Mutex::new(DriverLog::default()));
        let driver = Self {
            pages: HashMap::new(),
            current: None,
            hidden: HashSet::new(),
            log: Arc::clone(&log),
        };
        (driver, log)
    }

    pub fn page(mut self, url: &str, html: impl Into<String>) -> Self {
        self.pages.insert(url.to_string(), html.into());
        self
    }

    fn current_html(&self) -> Result<&str, LookupError> {
        self.current
            .as_ref()
            .and_then(|url| self.pages.get(url))
            .map(String::as_str)
            .ok_or_else(|| LookupError::Browser("no page loaded".to_string()))
    }

    fn matches(&self, selector: &str) -> Result<bool, LookupError> {
        let parsed = Selector::parse(selector)
            .map_err(|e| LookupError::Browser(format!("bad selector {selector}: {e}")))?;
        let document = Html::parse_document(self.current_html()?);
        let found = document.select(&parsed).next().is_some();
        Ok(found)
    }
}

#[async_trait]
impl PageDriver for FakeDriver {
    async fn goto(&mut self, url: &str) -> Result<(), LookupError> {
        self.log.lock().unwrap().visits.push(url.to_string());
        if !self.pages.contains_key(url) {
            return Err(LookupError::Navigation {
                url: url.to_string(),
                reason: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        self.current = Some(url.to_string());
        self.hidden.clear();
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, LookupError> {
        self.current
            .clone()
            .ok_or_else(|| LookupError::Browser("no page loaded".to_string()))
    }

    async fn probe(&mut self, selector: &str, state: ElementState) -> Result<bool, LookupError> {
        let attached = self.matches(selector)?;
        let rendered = attached && !self.hidden.contains(selector);
        Ok(match state {
            ElementState::Present => attached,
            ElementState::Visible => rendered,
            ElementState::Hidden => !rendered,
        })
    }

    async fn click(&mut self, selector: &str) -> Result<(), LookupError> {
        if !self.matches(selector)? {
            return Err(LookupError::NotFound {
                selector: selector.to_string(),
            });
        }
        self.log.lock().unwrap().clicks.push(selector.to_string());
        if selector == OVERLAY_CLOSE_SELECTOR {
            self.hidden.insert(HELP_OVERLAY_SELECTOR.to_string());
            self.hidden.insert(OVERLAY_CLOSE_SELECTOR.to_string());
        }
        Ok(())
    }

    async fn content(&mut self) -> Result<String, LookupError> {
        self.current_html().map(str::to_string)
    }

    async fn close(&mut self) -> Result<(), LookupError> {
        self.log.lock().unwrap().closed = true;
        Ok(())
    }
}

/// Short waits so timeouts resolve quickly.
pub fn fast_options() -> NavigatorOptions {
    NavigatorOptions {
        wait_timeout: Duration::from_millis(30),
        poll_interval: Duration::from_millis(5),
        ..NavigatorOptions::default()
    }
}

pub fn source_url(urn: &str) -> String {
    format!("https://www.lexml.gov.br/urn/{urn}")
}

/// LexML page listing one tribunal publication linked at `href`.
pub fn source_page(href: &str) -> String {
    format!(
        r#"<html><body>
          <div class="panel-body">Diário Oficial da União (text/html)
            <a class="noprint" href="https://dou.example/materia/1">ver</a></div>
          <div class="panel-body">Tribunal de Contas da União (text/html)
            <a class="noprint" href="{href}">Acórdão</a></div>
        </body></html>"#
    )
}

/// LexML page whose panel has no tribunal entry.
pub fn source_page_without_match() -> String {
    r#"<html><body>
      <div class="panel-body">Diário Oficial da União (text/html)
        <a class="noprint" href="https://dou.example/materia/1">ver</a></div>
    </body></html>"#
        .to_string()
}

/// LexML page that never renders its panel.
pub fn source_page_without_panel() -> String {
    "<html><body><p>Carregando...</p></body></html>".to_string()
}

/// Detail page with every field filled; `overlay` adds the help popup.
pub fn detail_page(overlay: bool) -> String {
    let popup = if overlay {
        r#"<ajuda><div class="modal"><button class="modal-close">x</button></div></ajuda>"#
    } else {
        ""
    };
    format!(
        r#"<html><body><app-root><header>TCU</header><main>
          <div id="conteudo_numero_acordao"><a href="/acordao-completo/2396">ACÓRDÃO 2396/2020</a></div>
          <div id="conteudo_relator">BENJAMIN ZYMLER</div>
          <div id="conteudo_processo">TC 018.456/2019-1</div>
          <div id="conteudo_tipo_processo">RELATÓRIO DE AUDITORIA (RA)</div>
          <div id="conteudo_data_sessao">02/09/2020</div>
          <div id="conteudo_numero_ata"><a href="/ata/33">33/2020</a></div>
          <div id="conteudo_interessado">Congresso Nacional</div>
          <div id="conteudo_entidade">Ministério da Saúde</div>
          <div id="conteudo_representante_mp">não atuou</div>
          <div id="conteudo_unidade_tecnica">SecexSaúde</div>
          <div id="conteudo_representante_leval">não há</div>
          <div id="conteudo_assunto">Auditoria de conformidade</div>
          <div id="conteudo_sumario">AUDITORIA. RECOMENDAÇÕES.</div>
          <div id="conteudo_acordao">VISTOS, relatados e discutidos
            estes autos d'água.</div>
          <div id="conteudo_quorum">Ministros presentes</div>
          <div id="conteudo_relatorio">Trata-se de auditoria.</div>
          <div id="conteudo_voto">Acolho a proposta.</div>
        </main>{popup}</app-root></body></html>"#
    )
}

/// Log output captured from the current thread's subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's `tracing` events into the buffer until the guard drops.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Lines logged at WARN containing `needle`.
    pub fn warnings(&self, needle: &str) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(" WARN ") && line.contains(needle))
            .map(str::to_string)
            .collect()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = CapturedLogs;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
