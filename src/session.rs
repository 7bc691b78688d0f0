//! Line-oriented interactive session: typed commands drive the capture state
//! and the orchestrator.

use std::str::FromStr;
use thiserror::Error;

use crate::capture::{IngredientCapture, Utterance};
use crate::catalog::{self, DietaryRestriction};
use crate::gate::CredentialStatus;
use crate::orchestrator::{Applied, Completion, Orchestrator, SubmitOutcome};
use crate::presentation::{self, cards};

pub const HELP: &str = "\
الأوامر:
  add <مكون>            أضف مكوناً
  remove <مكون>         احذف مكوناً
  voice [نص]            أضف مكونات من نص مُملى (مثال: دجاج و أرز، طماطم)
  catalog [بحث]         تصفح قائمة المكونات
  pick <مكون>           أضف مكوناً من القائمة
  diet <قيد>            بدّل قيداً غذائياً (vegetarian, vegan, gluten-free, dairy-free, low-carb)
  count <1-5>           عدد الوصفات المطلوبة
  generate              اصنع لي وصفة!
  vary <رقم>            اقترح تنويعات للوصفة
  show                  اعرض النتائج الحالية
  key <مفتاح>           اختر مفتاح API
  clear                 امسح الكل
  help                  هذه القائمة
  quit                  خروج";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("أمر غير معروف: {0} (اكتب help)")]
    Unknown(String),

    #[error("الأمر {0} يحتاج إلى قيمة")]
    MissingArgument(&'static str),

    #[error("قيمة غير صالحة: {0}")]
    InvalidArgument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(String),
    Remove(String),
    Voice(Option<String>),
    Catalog(Option<String>),
    Pick(String),
    Diet(DietaryRestriction),
    Count(u8),
    Generate,
    Vary(usize),
    Show,
    Key(String),
    Clear,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let argument = (!rest.is_empty()).then(|| rest.to_string());
        let required = |command: &'static str| {
            argument
                .clone()
                .ok_or(CommandError::MissingArgument(command))
        };

        match name.to_lowercase().as_str() {
            "add" => Ok(Command::Add(required("add")?)),
            "remove" | "rm" => Ok(Command::Remove(required("remove")?)),
            "voice" => Ok(Command::Voice(argument.clone())),
            "catalog" => Ok(Command::Catalog(argument.clone())),
            "pick" => Ok(Command::Pick(required("pick")?)),
            "diet" => {
                let value = required("diet")?;
                DietaryRestriction::parse(&value)
                    .map(Command::Diet)
                    .ok_or(CommandError::InvalidArgument(value))
            }
            "count" => {
                let value = required("count")?;
                value
                    .parse()
                    .map(Command::Count)
                    .map_err(|_| CommandError::InvalidArgument(value))
            }
            "generate" | "go" => Ok(Command::Generate),
            "vary" => {
                let value = required("vary")?;
                value
                    .parse()
                    .map(Command::Vary)
                    .map_err(|_| CommandError::InvalidArgument(value))
            }
            "show" => Ok(Command::Show),
            "key" => Ok(Command::Key(required("key")?)),
            "clear" => Ok(Command::Clear),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Continue(String),
    Quit,
}

/// Capture state plus the orchestrator, driven one command at a time
pub struct Session {
    capture: IngredientCapture,
    orchestrator: Orchestrator,
}

impl Session {
    pub fn new(capture: IngredientCapture, orchestrator: Orchestrator) -> Self {
        Self {
            capture,
            orchestrator,
        }
    }

    pub fn capture(&self) -> &IngredientCapture {
        &self.capture
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn orchestrator_mut(&mut self) -> &mut Orchestrator {
        &mut self.orchestrator
    }

    /// Greeting shown at start, including the credential notice if needed
    pub fn start(&mut self) -> String {
        self.orchestrator.check_credential();
        if self.orchestrator.gate().is_open() {
            HELP.to_string()
        } else {
            format!("{}\n\n{}", presentation::render_credential_notice(), HELP)
        }
    }

    /// Parse and run one input line
    pub async fn handle_line(&mut self, line: &str) -> Reply {
        if line.trim().is_empty() {
            return Reply::Continue(String::new());
        }
        match line.parse::<Command>() {
            Ok(command) => self.execute(command).await,
            Err(e) => Reply::Continue(e.to_string()),
        }
    }

    pub async fn execute(&mut self, command: Command) -> Reply {
        let output = match command {
            Command::Add(ingredient) => {
                self.capture.set_draft(ingredient);
                if self.capture.commit_draft() {
                    self.ingredients_line()
                } else {
                    self.capture.set_draft("");
                    "المكون موجود بالفعل.".to_string()
                }
            }
            Command::Remove(ingredient) => {
                if self.capture.remove(&ingredient) {
                    self.ingredients_line()
                } else {
                    format!("لا يوجد مكون باسم {}", ingredient)
                }
            }
            Command::Voice(transcript) => {
                let utterance = match transcript {
                    Some(text) => Utterance::Transcript(text),
                    None => Utterance::Unsupported,
                };
                match self.capture.apply_utterance(utterance) {
                    Ok(added) if added.is_empty() => "لم تتم إضافة مكونات جديدة.".to_string(),
                    Ok(_) => self.ingredients_line(),
                    Err(notice) => notice.to_string(),
                }
            }
            Command::Catalog(term) => {
                render_catalog(term.as_deref().unwrap_or_default(), &self.capture)
            }
            Command::Pick(item) => {
                if self.capture.pick(&item) {
                    self.ingredients_line()
                } else if self.capture.contains(item.trim()) {
                    "المكون موجود بالفعل.".to_string()
                } else {
                    format!("{} ليس في قائمة المكونات.", item)
                }
            }
            Command::Diet(restriction) => {
                let selected = self.capture.toggle_restriction(restriction);
                let labels: Vec<&str> = self
                    .capture
                    .restrictions()
                    .iter()
                    .map(|r| r.label())
                    .collect();
                let current = if labels.is_empty() {
                    "لا شيء".to_string()
                } else {
                    labels.join("، ")
                };
                let state = if selected { "مُفعّل" } else { "أُلغي" };
                format!("{} {}. القيود الحالية: {}", restriction.label(), state, current)
            }
            Command::Count(count) => {
                let count = self.capture.set_recipe_count(count);
                format!("عدد الوصفات: {}", count)
            }
            Command::Generate => self.generate().await,
            Command::Vary(index) => self.vary(index),
            Command::Show => {
                let rendered = presentation::render_state(self.orchestrator.state());
                if rendered.is_empty() {
                    self.ingredients_line()
                } else {
                    rendered
                }
            }
            Command::Key(key) => {
                if self.orchestrator.select_credential(&key) == CredentialStatus::Available {
                    "تم تحديد مفتاح API.".to_string()
                } else {
                    presentation::render_credential_notice()
                }
            }
            Command::Clear => {
                self.capture.clear();
                self.orchestrator.clear();
                "تم مسح الكل.".to_string()
            }
            Command::Help => HELP.to_string(),
            Command::Quit => return Reply::Quit,
        };
        Reply::Continue(output)
    }

    async fn generate(&mut self) -> String {
        let Some(request) = self.capture.submission() else {
            return "أضف مكوناً واحداً على الأقل.".to_string();
        };
        match self.orchestrator.submit(request).await {
            SubmitOutcome::Empty => "أضف مكوناً واحداً على الأقل.".to_string(),
            SubmitOutcome::CredentialRequired => presentation::render_credential_notice(),
            SubmitOutcome::Shown(_) | SubmitOutcome::Failed(_) => {
                let mut output = presentation::render_state(self.orchestrator.state());
                if !self.orchestrator.gate().is_open() {
                    output.push_str("\n\n");
                    output.push_str(&presentation::render_credential_notice());
                }
                output
            }
        }
    }

    fn vary(&mut self, index: usize) -> String {
        let title = index
            .checked_sub(1)
            .and_then(|i| self.orchestrator.state().recipes()?.get(i))
            .map(|r| r.title.clone());
        let Some(title) = title else {
            return format!("لا توجد وصفة رقم {}", index);
        };
        if !self.orchestrator.gate().is_open() {
            return presentation::render_credential_notice();
        }
        if self.orchestrator.request_variations(&title) {
            format!("جاري البحث عن أفكار إبداعية لـ {}...", title)
        } else {
            format!("التنويعات لـ {} قيد التحضير بالفعل.", title)
        }
    }

    /// Wait for the next background completion and describe it for the user
    pub async fn next_update(&mut self) -> Option<String> {
        let Applied {
            completion,
            accepted,
        } = self.orchestrator.next_completion().await;
        if !accepted {
            return None;
        }
        let title = completion.title().to_string();
        let card = cards(self.orchestrator.state())
            .into_iter()
            .find(|card| card.recipe.title == title)?;
        let headline = match &completion {
            Completion::Image { result: Ok(_), .. } => format!("🖼  صورة {} جاهزة", title),
            Completion::Image { result: Err(_), .. } => format!("🖼  تعذر إنشاء صورة {}", title),
            Completion::Variations { result: Ok(_), .. } => {
                return Some(card.to_string());
            }
            Completion::Variations { result: Err(e), .. } => format!("{} ({})", e, title),
        };
        Some(headline)
    }

    fn ingredients_line(&self) -> String {
        if self.capture.ingredients().is_empty() {
            "لا توجد مكونات بعد.".to_string()
        } else {
            format!("المكونات: {}", self.capture.ingredients().join("، "))
        }
    }
}

/// Catalog listing, marking entries already chosen
pub fn render_catalog(term: &str, capture: &IngredientCapture) -> String {
    let results = catalog::search(term);
    if results.is_empty() {
        return "لم يتم العثور على نتائج.".to_string();
    }
    results
        .into_iter()
        .map(|(category, items)| {
            let items: Vec<String> = items
                .into_iter()
                .map(|item| {
                    if capture.contains(item) {
                        format!("{} ✓", item)
                    } else {
                        item.to_string()
                    }
                })
                .collect();
            format!("{}: {}", category, items.join("، "))
        })
        .collect::<Vec<_>>()
        .join("\n")
}
