use ratatui::style::Color;

const SUCCESS: &[&str] = &[
    "active", "approved", "completed", "done", "success", "paid", "delivered", "available",
    "نشط", "مكتمل", "معتمد", "تم", "ناجح", "مدفوع", "متاح",
];

const ERROR: &[&str] = &[
    "inactive", "rejected", "failed", "error", "cancelled", "canceled", "blocked", "unavailable",
    "غير نشط", "مرفوض", "فشل", "خطأ", "ملغي", "محظور", "غير متاح",
];

const WARNING: &[&str] = &[
    "pending", "waiting", "processing", "review", "draft", "on hold",
    "قيد الانتظار", "معلق", "قيد المعالجة", "قيد المراجعة", "مسودة",
];

/// Badge category for a rich-template status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
    Warning,
    Neutral,
}

impl StatusKind {
    /// Classify status text. The match is exact on the trimmed,
    /// case-folded text, so "Active" is a success but "Inactive" is not.
    pub fn classify(text: &str) -> Self {
        let normalized = text.trim().to_lowercase();
        let is = |words: &[&str]| words.iter().any(|w| *w == normalized);
        if is(SUCCESS) {
            StatusKind::Success
        } else if is(ERROR) {
            StatusKind::Error
        } else if is(WARNING) {
            StatusKind::Warning
        } else {
            StatusKind::Neutral
        }
    }

    pub fn class_name(self) -> &'static str {
        match self {
            StatusKind::Success => "sift-status-success",
            StatusKind::Error => "sift-status-error",
            StatusKind::Warning => "sift-status-warning",
            StatusKind::Neutral => "sift-status-default",
        }
    }

    pub fn color(self) -> Color {
        match self {
            StatusKind::Success => Color::Green,
            StatusKind::Error => Color::Red,
            StatusKind::Warning => Color::Yellow,
            StatusKind::Neutral => Color::Gray,
        }
    }
}
