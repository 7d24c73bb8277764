//! Top-level command dispatch
//!
//! Each [`Intent`] runs one linear pipeline. Results are written to `out`,
//! status echoes go through `tracing`.

use crate::api::{ApiClient, ListQuery, Transport};
use crate::cli::Intent;
use crate::config::Config;
use crate::connect::Connector;
use crate::credentials::{set_access_key, CredentialChain, KeyFile, KeyPrompt};
use crate::error::AppError;
use crate::platform::ProcessLauncher;
use crate::present::{render, render_detail};
use crate::select::{select, SelectMode};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub struct App<'a, T, L: ?Sized> {
    config: &'a Config,
    client: &'a ApiClient<T>,
    launcher: &'a L,
    credentials: &'a CredentialChain,
    prompt: &'a dyn KeyPrompt,
    init_path: PathBuf,
    verbose: bool,
}

impl<'a, T, L> App<'a, T, L>
where
    T: Transport,
    L: ProcessLauncher + ?Sized,
{
    pub fn new(
        config: &'a Config,
        client: &'a ApiClient<T>,
        launcher: &'a L,
        credentials: &'a CredentialChain,
        prompt: &'a dyn KeyPrompt,
    ) -> Self {
        Self {
            config,
            client,
            launcher,
            credentials,
            prompt,
            init_path: PathBuf::from(crate::config::LOCAL_CONFIG_FILE),
            verbose: false,
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Where `--init-config` writes the default config
    pub fn init_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.init_path = path.into();
        self
    }

    pub fn run(&self, intent: Intent, out: &mut dyn Write) -> Result<(), AppError> {
        match intent {
            Intent::FetchServers { query, limit } => self.fetch_servers(&query, limit, out),
            Intent::Info { id } => self.info(&id, out),
            Intent::Connect { query, mode } => self.connect(&query, mode, out),
            Intent::SetAccessKey => {
                let file = KeyFile::new(&self.config.paths.key_file);
                set_access_key(self.prompt, &file)?;
                writeln!(out, "Access key saved to {}", file.path().display())?;
                Ok(())
            }
            Intent::InitConfig => init_config(&self.init_path, out),
        }
    }

    fn fetch_servers(
        &self,
        query: &ListQuery,
        limit: usize,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        let key = self.credentials.resolve()?;
        debug!(
            "Fetching available VPN servers from {}\nFilter: {}\nOrder: {}\nSorted by: {}",
            self.client.endpoint(),
            query
                .filter
                .as_ref()
                .map(|f| format!("{}={}", f.field.as_str(), f.value))
                .unwrap_or_else(|| "Any".to_string()),
            query
                .sort
                .map(|s| format!("{:?}", s.order_by))
                .unwrap_or_else(|| "None".to_string()),
            query
                .sort
                .and_then(|s| s.direction)
                .map(|d| format!("{:?}", d))
                .unwrap_or_else(|| "None".to_string()),
        );

        let servers = self.client.list_servers(&key, query)?.into_result()?;
        if servers.is_empty() {
            writeln!(out, "No servers found")?;
            return Ok(());
        }

        write!(out, "{}", render(&servers, self.verbose, limit))?;
        if servers.len() > limit {
            writeln!(
                out,
                "Showing {} of {} servers (use --limit to see more)",
                limit,
                servers.len()
            )?;
        }
        Ok(())
    }

    fn info(&self, id: &str, out: &mut dyn Write) -> Result<(), AppError> {
        let key = self.credentials.resolve()?;
        let detail = self
            .client
            .get_server(&key, id)?
            .into_result()
            .map_err(|failure| failure.into_lookup_error(id))?;

        write!(out, "{}", render_detail(&detail))?;
        Ok(())
    }

    fn connect(
        &self,
        query: &ListQuery,
        mode: SelectMode,
        out: &mut dyn Write,
    ) -> Result<(), AppError> {
        let key = self.credentials.resolve()?;
        let mut servers = self.client.list_servers(&key, query)?.into_result()?;

        let wanted = query.filter.as_ref().map(|f| f.value.as_str());
        if let Some(wanted) = wanted {
            if servers.is_empty() && self.config.connect.fallback_to_any_country {
                warn!("No server found in {}, falling back to any country", wanted);
                let any_country = ListQuery {
                    filter: None,
                    sort: query.sort,
                };
                servers = self
                    .client
                    .list_servers(&key, &any_country)?
                    .into_result()?;
            }
        }

        let server = select(&servers, mode)
            .ok_or_else(|| AppError::NoServerAvailable(wanted.map(str::to_string)))?;
        info!(
            "Selected server {} ({}, {}, ping {})",
            server.id, server.host_name, server.country, server.ping
        );

        let connector = Connector::new(self.client, self.launcher, &self.config.paths.output_dir);
        let result = connector.connect(&server.id, &key)?;

        writeln!(
            out,
            "Connected to {} ({}). Configuration saved to {}",
            result.server.host_name,
            result.server.country,
            result.config_path.display()
        )?;
        Ok(())
    }
}

/// Write the default config to `path` (never overwrites)
pub fn init_config(path: &Path, out: &mut dyn Write) -> Result<(), AppError> {
    Config::init(path)?;
    writeln!(out, "Created default config: {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Filter, FilterField, OrderBy, SortDirection, SortSpec};
    use crate::connect::ConnectError;
    use crate::credentials::{CredentialError, StaticKey};
    use crate::error::{exit, ValidationError};
    use crate::testing::{
        detail_json, failure_body, get_body, list_body, summary_json, MockLauncher, MockPrompt,
        MockTransport,
    };
    use serde_json::json;
    use tempfile::TempDir;

    struct Fixture {
        temp_dir: TempDir,
        config: Config,
        client: ApiClient<MockTransport>,
        launcher: MockLauncher,
        credentials: CredentialChain,
        prompt: MockPrompt,
    }

    impl Fixture {
        fn new() -> Self {
            let temp_dir = TempDir::new().unwrap();
            let mut config = Config::default();
            config.paths.key_file = temp_dir.path().join("openblu.key");
            config.paths.output_dir = temp_dir.path().to_path_buf();

            Self {
                temp_dir,
                config,
                client: ApiClient::new("https://api.example.test/v1", MockTransport::new()),
                launcher: MockLauncher::exiting_with(0),
                credentials: CredentialChain::new(vec![Box::new(StaticKey::new(Some(
                    "secret".to_string(),
                )))]),
                prompt: MockPrompt(Some("typed-key".to_string())),
            }
        }

        fn transport(&self) -> &MockTransport {
            self.client.transport()
        }

        fn run(&self, intent: Intent) -> (Result<(), AppError>, String) {
            let app = App::new(
                &self.config,
                &self.client,
                &self.launcher,
                &self.credentials,
                &self.prompt,
            )
            .init_path(self.temp_dir.path().join("openblu.toml"));

            let mut out = Vec::new();
            let result = app.run(intent, &mut out);
            (result, String::from_utf8(out).unwrap())
        }
    }

    fn country(name: &str) -> ListQuery {
        ListQuery {
            filter: Some(Filter::for_country(name).unwrap()),
            sort: None,
        }
    }

    #[test]
    fn test_fetch_filtered_sorted_limited() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![
            summary_json("s1", 12, 100),
            summary_json("s2", 18, 300),
            summary_json("s3", 25, 200),
            summary_json("s4", 31, 400),
            summary_json("s5", 40, 500),
        ]));

        let query = ListQuery {
            filter: Some(Filter {
                field: FilterField::Country,
                value: "Italy".to_string(),
            }),
            sort: Some(SortSpec {
                order_by: OrderBy::Ping,
                direction: Some(SortDirection::Ascending),
            }),
        };
        let (result, output) = fixture.run(Intent::FetchServers { query, limit: 3 });
        result.unwrap();

        let requests = fixture.transport().requests();
        assert_eq!(
            requests[0].1,
            json!({
                "access_key": "secret",
                "filter": "country",
                "by": "Italy",
                "order_by": "ping",
                "sort_by": "ascending",
            })
        );

        let pings: Vec<u32> = output
            .lines()
            .skip(1)
            .filter(|line| line.starts_with('s'))
            .map(|line| line.split_whitespace().nth(3).unwrap().parse().unwrap())
            .collect();
        assert_eq!(pings, vec![12, 18, 25]);
        assert!(pings.windows(2).all(|w| w[0] <= w[1]));
        assert!(output.contains("Showing 3 of 5 servers"));
    }

    #[test]
    fn test_fetch_empty_list() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![]));

        let (result, output) = fixture.run(Intent::FetchServers {
            query: ListQuery::default(),
            limit: 5,
        });
        result.unwrap();
        assert_eq!(output, "No servers found\n");
    }

    #[test]
    fn test_fetch_api_failure() {
        let fixture = Fixture::new();
        fixture
            .transport()
            .respond(failure_body(401, 101, "Invalid access key"));

        let (result, output) = fixture.run(Intent::FetchServers {
            query: ListQuery::default(),
            limit: 5,
        });
        let err = result.unwrap_err();
        assert!(matches!(err, AppError::Api(_)));
        assert!(err.to_string().contains("API Error Code: 101"));
        assert_eq!(err.exit_code(), exit::FAILURE);
        assert!(output.is_empty());
    }

    #[test]
    fn test_missing_key_makes_no_request() {
        let mut fixture = Fixture::new();
        fixture.credentials = CredentialChain::new(vec![Box::new(StaticKey::new(None))]);

        let (result, _) = fixture.run(Intent::FetchServers {
            query: ListQuery::default(),
            limit: 5,
        });
        assert!(matches!(
            result,
            Err(AppError::Credential(CredentialError::Missing))
        ));
        assert!(fixture.transport().requests().is_empty());
    }

    #[test]
    fn test_info_not_found() {
        let fixture = Fixture::new();
        fixture
            .transport()
            .respond(failure_body(404, 2, "Server not found"));

        let (result, _) = fixture.run(Intent::Info {
            id: "nope".to_string(),
        });
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Server nope was not found");
        assert_eq!(err.exit_code(), exit::FAILURE);
    }

    #[test]
    fn test_info_renders_detail() {
        let fixture = Fixture::new();
        fixture
            .transport()
            .respond(get_body(detail_json("a1", "client\n")));

        let (result, output) = fixture.run(Intent::Info {
            id: "a1".to_string(),
        });
        result.unwrap();
        assert!(output.contains("a1.vpn.example.net"));
        assert!(output.contains("Italy (IT)"));
        assert!(!fixture.temp_dir.path().join("a1.ovpn").exists());
    }

    #[test]
    fn test_connect_best_in_country() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![
            summary_json("old", 10, 100),
            summary_json("new", 50, 900),
            summary_json("mid", 20, 500),
        ]));
        fixture
            .transport()
            .respond(get_body(detail_json("new", "client\nremote new\n")));

        let (result, output) = fixture.run(Intent::Connect {
            query: country("IT"),
            mode: SelectMode::Best,
        });
        result.unwrap();

        let requests = fixture.transport().requests();
        assert_eq!(requests[0].1["filter"], "country_short");
        assert_eq!(requests[0].1["by"], "IT");
        assert_eq!(requests[1].1, json!({"access_key": "secret", "id": "new"}));

        let path = fixture.temp_dir.path().join("new.ovpn");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "client\nremote new\n");
        assert_eq!(fixture.launcher.launched(), vec![path]);
        assert!(output.starts_with("Connected to new.vpn.example.net"));
    }

    #[test]
    fn test_connect_first() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![
            summary_json("first", 10, 100),
            summary_json("newest", 50, 900),
        ]));
        fixture
            .transport()
            .respond(get_body(detail_json("first", "client\n")));

        let (result, _) = fixture.run(Intent::Connect {
            query: ListQuery::default(),
            mode: SelectMode::First,
        });
        result.unwrap();
        assert!(fixture.temp_dir.path().join("first.ovpn").exists());
    }

    #[test]
    fn test_connect_sends_sort() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![
            summary_json("fast", 8, 100),
            summary_json("slow", 90, 900),
        ]));
        fixture
            .transport()
            .respond(get_body(detail_json("fast", "client\n")));

        let query = ListQuery {
            sort: Some(SortSpec {
                order_by: OrderBy::Ping,
                direction: Some(SortDirection::Ascending),
            }),
            ..country("IT")
        };
        let (result, _) = fixture.run(Intent::Connect {
            query,
            mode: SelectMode::First,
        });
        result.unwrap();

        let requests = fixture.transport().requests();
        assert_eq!(
            requests[0].1,
            json!({
                "access_key": "secret",
                "filter": "country_short",
                "by": "IT",
                "order_by": "ping",
                "sort_by": "ascending",
            })
        );
        assert_eq!(
            fixture.launcher.launched(),
            vec![fixture.temp_dir.path().join("fast.ovpn")]
        );
    }

    #[test]
    fn test_connect_fallback_keeps_sort() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![]));
        fixture
            .transport()
            .respond(list_body(vec![summary_json("any", 10, 100)]));
        fixture
            .transport()
            .respond(get_body(detail_json("any", "client\n")));

        let query = ListQuery {
            sort: Some(SortSpec {
                order_by: OrderBy::Score,
                direction: None,
            }),
            ..country("Atlantis")
        };
        let (result, _) = fixture.run(Intent::Connect {
            query,
            mode: SelectMode::First,
        });
        result.unwrap();

        let requests = fixture.transport().requests();
        assert_eq!(requests[1].1, json!({"access_key": "secret", "order_by": "score"}));
    }

    #[test]
    fn test_connect_falls_back_to_any_country() {
        let fixture = Fixture::new();
        fixture.transport().respond(list_body(vec![]));
        fixture
            .transport()
            .respond(list_body(vec![summary_json("any", 10, 100)]));
        fixture
            .transport()
            .respond(get_body(detail_json("any", "client\n")));

        let (result, _) = fixture.run(Intent::Connect {
            query: country("Atlantis"),
            mode: SelectMode::First,
        });
        result.unwrap();

        let requests = fixture.transport().requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].1, json!({"access_key": "secret"}));
        assert!(fixture.temp_dir.path().join("any.ovpn").exists());
    }

    #[test]
    fn test_connect_no_server_without_fallback() {
        let mut fixture = Fixture::new();
        fixture.config.connect.fallback_to_any_country = false;
        fixture.transport().respond(list_body(vec![]));

        let (result, _) = fixture.run(Intent::Connect {
            query: country("Atlantis"),
            mode: SelectMode::Best,
        });
        assert!(matches!(result, Err(AppError::NoServerAvailable(Some(ref c))) if c == "Atlantis"));
        assert_eq!(fixture.transport().requests().len(), 1);
        assert!(fixture.launcher.launched().is_empty());
    }

    #[test]
    fn test_connect_launch_failure() {
        let mut fixture = Fixture::new();
        fixture.launcher = MockLauncher::exiting_with(1);
        fixture
            .transport()
            .respond(list_body(vec![summary_json("a", 10, 100)]));
        fixture
            .transport()
            .respond(get_body(detail_json("a", "client\n")));

        let (result, _) = fixture.run(Intent::Connect {
            query: ListQuery::default(),
            mode: SelectMode::Best,
        });
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AppError::Connect(ConnectError::ProcessLaunch { code: 1 })
        ));
        assert_eq!(err.exit_code(), exit::UNKNOWN_ERROR);
        assert!(fixture.temp_dir.path().join("a.ovpn").exists());
    }

    #[test]
    fn test_set_access_key() {
        let fixture = Fixture::new();

        let (result, output) = fixture.run(Intent::SetAccessKey);
        result.unwrap();
        assert_eq!(
            std::fs::read_to_string(&fixture.config.paths.key_file).unwrap(),
            "typed-key\n"
        );
        assert!(output.starts_with("Access key saved to"));
    }

    #[test]
    fn test_set_access_key_empty_input() {
        let mut fixture = Fixture::new();
        fixture.prompt = MockPrompt(Some(String::new()));

        let (result, _) = fixture.run(Intent::SetAccessKey);
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            AppError::Credential(CredentialError::Invalid(ValidationError::EmptyAccessKey))
        ));
        assert_eq!(err.exit_code(), exit::FAILURE);
        assert!(!fixture.config.paths.key_file.exists());
    }

    #[test]
    fn test_set_access_key_interrupted() {
        let mut fixture = Fixture::new();
        fixture.prompt = MockPrompt(None);

        let (result, _) = fixture.run(Intent::SetAccessKey);
        assert_eq!(result.unwrap_err().exit_code(), exit::INTERRUPTED);
        assert!(!fixture.config.paths.key_file.exists());
    }

    #[test]
    fn test_init_config() {
        let fixture = Fixture::new();

        let (result, output) = fixture.run(Intent::InitConfig);
        result.unwrap();
        let path = fixture.temp_dir.path().join("openblu.toml");
        assert_eq!(Config::load(&path).unwrap(), Config::default());
        assert!(output.starts_with("Created default config"));

        let (result, _) = fixture.run(Intent::InitConfig);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
