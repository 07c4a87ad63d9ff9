use std::time::{Duration, Instant};

use advisor_api::HealthStatus;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::components::{
    AdviceGenerator, Component, CourseList, PerformanceReport, StudentForm, StudentList,
    UploadForm,
};
use crate::config::Config;
use crate::remote::{failure_message, Remote};
use crate::task::{Delivery, Outgoing, Reply, Request, Requester, Slot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Students,
    Courses,
    Analysis,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Home, Page::Students, Page::Courses, Page::Analysis];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Students => "Students",
            Page::Courses => "Courses",
            Page::Analysis => "Analysis",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeTab {
    Upload,
    NewStudent,
    Advice,
}

impl HomeTab {
    pub const ALL: [HomeTab; 3] = [HomeTab::Upload, HomeTab::NewStudent, HomeTab::Advice];

    pub fn title(&self) -> &'static str {
        match self {
            HomeTab::Upload => "Upload Course",
            HomeTab::NewStudent => "Add Student",
            HomeTab::Advice => "Learning Advice",
        }
    }

    fn next(self) -> Self {
        match self {
            HomeTab::Upload => HomeTab::NewStudent,
            HomeTab::NewStudent => HomeTab::Advice,
            HomeTab::Advice => HomeTab::Upload,
        }
    }
}

/// The one mounted view. Replacing it unmounts the previous one.
pub enum Screen {
    Upload(UploadForm),
    NewStudent(StudentForm),
    Advice(AdviceGenerator),
    Students(StudentList),
    Courses(CourseList),
    Analysis(PerformanceReport),
}

impl Screen {
    fn build(page: Page, tab: HomeTab) -> Self {
        match (page, tab) {
            (Page::Home, HomeTab::Upload) => Screen::Upload(UploadForm::new()),
            (Page::Home, HomeTab::NewStudent) => Screen::NewStudent(StudentForm::new()),
            (Page::Home, HomeTab::Advice) => Screen::Advice(AdviceGenerator::new()),
            (Page::Students, _) => Screen::Students(StudentList::new()),
            (Page::Courses, _) => Screen::Courses(CourseList::new()),
            (Page::Analysis, _) => Screen::Analysis(PerformanceReport::new()),
        }
    }

    pub fn component(&self) -> &dyn Component {
        match self {
            Screen::Upload(view) => view,
            Screen::NewStudent(view) => view,
            Screen::Advice(view) => view,
            Screen::Students(view) => view,
            Screen::Courses(view) => view,
            Screen::Analysis(view) => view,
        }
    }

    pub fn component_mut(&mut self) -> &mut dyn Component {
        match self {
            Screen::Upload(view) => view,
            Screen::NewStudent(view) => view,
            Screen::Advice(view) => view,
            Screen::Students(view) => view,
            Screen::Courses(view) => view,
            Screen::Analysis(view) => view,
        }
    }
}

pub struct App {
    pub config: Config,
    pub page: Page,
    pub tab: HomeTab,
    pub screen: Screen,

    // Service health
    health_requester: Requester,
    pub health: Remote<HealthStatus>,
    pub health_checked: Option<DateTime<Local>>,
    last_health_request: Option<Instant>,

    outbox: Vec<Outgoing>,
}

impl App {
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            config,
            page: Page::Home,
            tab: HomeTab::Upload,
            screen: Screen::build(Page::Home, HomeTab::Upload),
            health_requester: Requester::new(),
            health: Remote::Pending,
            health_checked: None,
            last_health_request: None,
            outbox: Vec::new(),
        };
        let initial = app.screen.component_mut().mount();
        app.outbox.extend(initial);
        app
    }

    /// Requests queued since the last call.
    pub fn take_outbox(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    pub fn navigate(&mut self, page: Page) {
        if self.page == page {
            return;
        }
        self.page = page;
        self.remount();
    }

    /// Cycle the Home tabs. Only meaningful on the Home page.
    pub fn next_tab(&mut self) {
        if self.page != Page::Home {
            return;
        }
        self.tab = self.tab.next();
        self.remount();
    }

    fn remount(&mut self) {
        debug!(page = self.page.title(), tab = self.tab.title(), "mounting view");
        self.screen = Screen::build(self.page, self.tab);
        let requests = self.screen.component_mut().mount();
        self.outbox.extend(requests);
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let is_ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if is_ctrl => return true,
            KeyCode::F(1) => self.navigate(Page::Home),
            KeyCode::F(2) => self.navigate(Page::Students),
            KeyCode::F(3) => self.navigate(Page::Courses),
            KeyCode::F(4) => self.navigate(Page::Analysis),
            KeyCode::F(5) => self.next_tab(),
            _ => {
                let requests = self.screen.component_mut().handle_key(key);
                self.outbox.extend(requests);
            }
        }
        false
    }

    /// Route a finished request to the view that issued it. Responses for
    /// views no longer mounted are dropped.
    pub fn deliver(&mut self, delivery: Delivery) {
        let mount = delivery.ticket.mount;

        if mount == self.health_requester.mount() {
            self.on_health(delivery);
            return;
        }

        if self.screen.component().owns(mount) {
            let requests = self.screen.component_mut().on_delivery(delivery);
            self.outbox.extend(requests);
        } else {
            debug!(
                mount,
                slot = ?delivery.ticket.slot,
                "response for unmounted view dropped"
            );
        }
    }

    /// Periodic work: issue a health check when one is due.
    pub fn tick(&mut self, now: Instant) {
        let interval = Duration::from_secs(self.config.display.health_interval_secs.max(1));
        let due = self
            .last_health_request
            .map_or(true, |last| now.duration_since(last) >= interval);
        if due {
            self.last_health_request = Some(now);
            let outgoing = self.health_requester.issue(Slot::Health, Request::Health);
            self.outbox.push(outgoing);
        }
    }

    fn on_health(&mut self, delivery: Delivery) {
        if !self.health_requester.accept(&delivery.ticket) {
            return;
        }
        self.health_checked = Some(Local::now());
        self.health = match delivery.outcome {
            Ok(Reply::Health(status)) => Remote::Ready(status),
            Ok(other) => Remote::Failed(failure_message(&other.unexpected(), "offline")),
            Err(e) => Remote::Failed(failure_message(&e, "offline")),
        };
    }

    pub fn is_online(&self) -> bool {
        self.health.ready().is_some_and(HealthStatus::is_healthy)
    }

    /// Key help for the status bar.
    pub fn status_text(&self) -> String {
        format!(
            "{}  │  F1-F4:pages F5:home tab ^C:quit",
            self.screen.component().hints()
        )
    }
}
