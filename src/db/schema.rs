/// SQL-schema för LoveDiary
///
/// Nya databaser skapas direkt på senaste versionen. Äldre databaser
/// uppgraderas stegvis i `migrations`.

pub const SCHEMA_VERSION: i32 = 4;

pub const CREATE_TABLES: &str = r#"
-- Appkonfiguration (singleton, id=1)
CREATE TABLE IF NOT EXISTS app_config (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    start_date TEXT,
    my_name TEXT NOT NULL DEFAULT '',
    partner_name TEXT NOT NULL DEFAULT '',
    show_day_counter INTEGER NOT NULL DEFAULT 1,
    show_mood_streak INTEGER NOT NULL DEFAULT 1,
    show_anniversary_banner INTEGER NOT NULL DEFAULT 1,
    reminder_enabled INTEGER NOT NULL DEFAULT 0,
    reminder_time TEXT,
    dark_mode TEXT NOT NULL DEFAULT 'system',
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Humördagbok, en post per dag
CREATE TABLE IF NOT EXISTS daily_moods (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL UNIQUE,
    mood TEXT NOT NULL,
    score INTEGER NOT NULL,
    note TEXT,
    image_path TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Konfiguration för incheckningsströmmar
CREATE TABLE IF NOT EXISTS unified_checkin_configs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    check_in_type TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '',
    countdown_mode TEXT,
    start_date TEXT,
    target_date TEXT,
    target_count INTEGER,
    progress INTEGER NOT NULL DEFAULT 0,
    reminder_time TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Incheckningar, en per ström och dag
CREATE TABLE IF NOT EXISTS unified_checkins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    config_id INTEGER,
    name TEXT NOT NULL,
    check_in_type TEXT NOT NULL,
    date TEXT NOT NULL,
    mood TEXT,
    score INTEGER,
    note TEXT,
    image_path TEXT,
    is_completed INTEGER NOT NULL DEFAULT 1,
    count INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (config_id) REFERENCES unified_checkin_configs(id) ON DELETE SET NULL,
    UNIQUE (name, date)
);

-- Vanor (äldre modell, hålls i synk med unified_*)
CREATE TABLE IF NOT EXISTS habits (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    icon TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '',
    habit_type TEXT NOT NULL DEFAULT 'positive',
    target_count INTEGER NOT NULL DEFAULT 0,
    target_date TEXT,
    current_count INTEGER NOT NULL DEFAULT 0,
    total_check_ins INTEGER NOT NULL DEFAULT 0,
    last_check_in_date TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
    unified_config_id INTEGER REFERENCES unified_checkin_configs(id) ON DELETE SET NULL
);

-- Incheckningar för vanor
CREATE TABLE IF NOT EXISTS habit_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    habit_id INTEGER NOT NULL,
    date TEXT NOT NULL,
    count INTEGER NOT NULL,
    note TEXT,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (habit_id) REFERENCES habits(id) ON DELETE CASCADE,
    UNIQUE (habit_id, date)
);

-- Migrationshistorik
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// Tabeller som tillkom i version 2
pub const UNIFIED_TABLES_V2: &str = r#"
CREATE TABLE IF NOT EXISTS unified_checkin_configs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    check_in_type TEXT NOT NULL,
    icon TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT '',
    countdown_mode TEXT,
    start_date TEXT,
    target_date TEXT,
    target_count INTEGER,
    progress INTEGER NOT NULL DEFAULT 0,
    reminder_time TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS unified_checkins (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    config_id INTEGER,
    name TEXT NOT NULL,
    check_in_type TEXT NOT NULL,
    date TEXT NOT NULL,
    mood TEXT,
    score INTEGER,
    note TEXT,
    image_path TEXT,
    is_completed INTEGER NOT NULL DEFAULT 1,
    count INTEGER,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    FOREIGN KEY (config_id) REFERENCES unified_checkin_configs(id) ON DELETE SET NULL,
    UNIQUE (name, date)
);
"#;

/// Index som tillkom i version 4 (ingår även i nya databaser)
pub const INDEXES_V4: &str = r#"
CREATE INDEX IF NOT EXISTS idx_daily_moods_date ON daily_moods(date);
CREATE INDEX IF NOT EXISTS idx_habits_active ON habits(is_active);
CREATE INDEX IF NOT EXISTS idx_habit_records_habit_date ON habit_records(habit_id, date);
CREATE INDEX IF NOT EXISTS idx_unified_checkins_name_date ON unified_checkins(name, date);
"#;

/// Tabeller som töms vid fullständig återställning (barn före föräldrar)
pub const DATA_TABLES: &[&str] = &[
    "habit_records",
    "unified_checkins",
    "habits",
    "unified_checkin_configs",
    "daily_moods",
    "app_config",
];
