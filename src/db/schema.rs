pub const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS subjects (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT NOT NULL,
    owner_email TEXT,
    status TEXT NOT NULL DEFAULT 'pending',
    progress TEXT,
    last_scan_at TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS scan_reports (
    id TEXT PRIMARY KEY,
    subject_id TEXT NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
    domain TEXT NOT NULL,
    score INTEGER NOT NULL,
    host_count INTEGER NOT NULL DEFAULT 0,
    open_port_count INTEGER NOT NULL DEFAULT 0,
    vulnerability_count INTEGER NOT NULL DEFAULT 0,
    finding_count_critical INTEGER DEFAULT 0,
    finding_count_high INTEGER DEFAULT 0,
    finding_count_medium INTEGER DEFAULT 0,
    finding_count_low INTEGER DEFAULT 0,
    finding_count_info INTEGER DEFAULT 0,
    duration_ms INTEGER NOT NULL DEFAULT 0,
    report_json TEXT NOT NULL,
    generated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS log_events (
    id TEXT PRIMARY KEY,
    level TEXT NOT NULL,
    message TEXT NOT NULL,
    subject_id TEXT,
    metadata TEXT,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_reports_subject ON scan_reports(subject_id, generated_at);
CREATE INDEX IF NOT EXISTS idx_log_events_subject ON log_events(subject_id);
CREATE INDEX IF NOT EXISTS idx_subjects_status ON subjects(status);
";
