use std::collections::HashMap;

/// Storage subsystem options, overridable from the node configuration.
#[derive(Clone, Copy, Debug)]
pub struct DbOptions {
    /// LRU block cache size in MiB (`-dbcache`).
    pub db_cache_mib: u64,
    /// Startup verification stringency, 0..=7 (`-checklevel`).
    pub check_level: u32,
    /// Tail depth scanned at startup; 0 means unlimited (`-checkblocks`).
    pub check_blocks: u32,
}

impl Default for DbOptions {
    fn default() -> Self {
        Self {
            db_cache_mib: 25,
            check_level: 1,
            check_blocks: 500,
        }
    }
}

impl DbOptions {
    /// Apply recognized options from a parsed configuration map. The last
    /// value of a repeated key wins, as in the node's conf handling.
    pub fn apply_conf(&mut self, conf: &HashMap<String, Vec<String>>) -> Result<(), String> {
        if let Some(values) = conf.get("dbcache") {
            if let Some(raw) = values.last() {
                self.db_cache_mib = raw
                    .parse::<u64>()
                    .map_err(|_| format!("invalid dbcache '{raw}'"))?;
            }
        }
        if let Some(values) = conf.get("checklevel") {
            if let Some(raw) = values.last() {
                let level = raw
                    .parse::<u32>()
                    .map_err(|_| format!("invalid checklevel '{raw}'"))?;
                if level > 7 {
                    return Err(format!("invalid checklevel '{raw}'"));
                }
                self.check_level = level;
            }
        }
        if let Some(values) = conf.get("checkblocks") {
            if let Some(raw) = values.last() {
                self.check_blocks = raw
                    .parse::<u32>()
                    .map_err(|_| format!("invalid checkblocks '{raw}'"))?;
            }
        }
        Ok(())
    }
}
