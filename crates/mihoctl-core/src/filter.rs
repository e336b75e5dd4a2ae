// ── Filter predicates ──
//
// Pure, case-insensitive predicates recomputed on every keystroke. An empty
// query matches everything.

use crate::model::{Connection, LogEntry, LogLevel, Rule};

/// Host, rule, any chain hop, or destination IP contains `query`.
pub fn connection_matches(conn: &Connection, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let q = query.to_lowercase();
    conn.host.to_lowercase().contains(&q)
        || conn.rule.to_lowercase().contains(&q)
        || conn.destination_ip.to_lowercase().contains(&q)
        || conn.chains.iter().any(|c| c.to_lowercase().contains(&q))
}

pub fn filter_connections<'a, I>(conns: I, query: &str) -> Vec<&'a Connection>
where
    I: IntoIterator<Item = &'a Connection>,
{
    conns
        .into_iter()
        .filter(|c| connection_matches(c, query))
        .collect()
}

/// Every whitespace-separated term appears in `type payload target`.
pub fn rule_matches(rule: &Rule, query: &str) -> bool {
    let haystack = rule.haystack().to_lowercase();
    query
        .split_whitespace()
        .all(|term| haystack.contains(&term.to_lowercase()))
}

/// Matching rules; each keeps its original `index`.
pub fn filter_rules<'a>(rules: &'a [Rule], query: &str) -> Vec<&'a Rule> {
    rules.iter().filter(|r| rule_matches(r, query)).collect()
}

/// At or above `min_level`, and the payload contains `query`.
pub fn log_matches(entry: &LogEntry, min_level: LogLevel, query: &str) -> bool {
    entry.level >= min_level
        && (query.is_empty() || entry.payload.to_lowercase().contains(&query.to_lowercase()))
}

pub fn filter_logs<'a, I>(entries: I, min_level: LogLevel, query: &str) -> Vec<&'a LogEntry>
where
    I: IntoIterator<Item = &'a LogEntry>,
{
    entries
        .into_iter()
        .filter(|e| log_matches(e, min_level, query))
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    use super::*;

    fn conn(id: &str, host: &str, dst: &str, rule: &str, chains: &[&str]) -> Connection {
        Connection {
            id: id.into(),
            network: "tcp".into(),
            inbound: "HTTP".into(),
            source_ip: "192.168.1.2".into(),
            source_port: "50000".into(),
            destination_ip: dst.into(),
            destination_port: "443".into(),
            host: host.into(),
            process: String::new(),
            upload: 0,
            download: 0,
            upload_speed: 0,
            download_speed: 0,
            start: None,
            chains: chains.iter().map(|s| (*s).to_owned()).collect(),
            rule: rule.into(),
            rule_payload: String::new(),
        }
    }

    fn rule(index: usize, kind: &str, payload: &str, target: &str) -> Rule {
        Rule {
            index,
            kind: kind.into(),
            payload: payload.into(),
            target: target.into(),
            size: None,
        }
    }

    fn log(level: LogLevel, payload: &str) -> LogEntry {
        LogEntry {
            level,
            payload: payload.into(),
            received_at: Utc::now(),
        }
    }

    #[test]
    fn connections_match_any_listed_field() {
        let conns = vec![
            conn("1", "www.Google.com", "142.250.0.1", "DomainSuffix", &["HK-01", "Proxy"]),
            conn("2", "", "1.1.1.1", "Match", &["DIRECT"]),
            conn("3", "github.com", "140.82.0.1", "GeoIP", &["JP-02"]),
        ];

        let ids = |q: &str| {
            filter_connections(&conns, q)
                .iter()
                .map(|c| c.id.as_str())
                .collect::<Vec<_>>()
        };

        assert_eq!(ids("google"), vec!["1"]);
        assert_eq!(ids("1.1.1"), vec!["2"]);
        assert_eq!(ids("geoip"), vec!["3"]);
        assert_eq!(ids("hk-01"), vec!["1"]);
        assert_eq!(ids(""), vec!["1", "2", "3"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let conns = vec![
            conn("1", "a.example", "10.0.0.1", "Match", &[]),
            conn("2", "b.test", "10.0.0.2", "Match", &[]),
        ];
        let once: Vec<Connection> = filter_connections(&conns, "example")
            .into_iter()
            .cloned()
            .collect();
        let twice = filter_connections(&once, "example");
        assert_eq!(twice.len(), once.len());
    }

    #[test]
    fn rule_terms_are_anded_and_index_is_kept() {
        let rules = vec![
            rule(0, "DomainSuffix", "google.com", "Proxy"),
            rule(1, "DomainSuffix", "github.com", "DIRECT"),
            rule(2, "GeoIP", "CN", "DIRECT"),
        ];

        let hits = filter_rules(&rules, "domainsuffix  direct");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].index, 1);

        assert_eq!(filter_rules(&rules, "   ").len(), 3);
        assert!(filter_rules(&rules, "geoip proxy").is_empty());
    }

    #[test]
    fn logs_filter_by_level_and_text() {
        let entries = vec![
            log(LogLevel::Debug, "dns lookup example.com"),
            log(LogLevel::Info, "TCP example.com:443 match Proxy"),
            log(LogLevel::Warning, "dial example.com failed"),
            log(LogLevel::Error, "listener closed"),
        ];

        assert_eq!(filter_logs(&entries, LogLevel::Info, "").len(), 3);
        assert_eq!(filter_logs(&entries, LogLevel::Debug, "EXAMPLE").len(), 3);
        assert_eq!(filter_logs(&entries, LogLevel::Warning, "example").len(), 1);
        assert!(filter_logs(&entries, LogLevel::Silent, "").is_empty());
    }
}
