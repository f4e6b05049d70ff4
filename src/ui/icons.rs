pub struct Icons;

impl Icons {
    pub const SCHOOL: &str = "🏫";
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const NEW: &str = "✨";
    pub const DEL: &str = "🗑️";
    pub const DATABASE: &str = "🗄️";
    pub const DIRECT: &str = "🔴";
    pub const QUESTION: &str = "❓";
}
