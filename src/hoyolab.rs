use crate::config::Config;
use crate::constants;
use crate::ds;
use crate::error::FetchError;
use crate::{PanelState, ResourceSnapshot};
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, ORIGIN, REFERER, USER_AGENT,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
pub struct ApiReply {
    pub retcode: i64,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Option<Value>,
}

impl ApiReply {
    fn not_configured() -> Self {
        Self {
            retcode: constants::RETCODE_NOT_CONFIGURED,
            message: constants::HSR_NOT_CONFIGURED_MESSAGE.to_string(),
            data: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenshinDailyNote {
    current_resin: u32,
    max_resin: u32,
    #[serde(deserialize_with = "seconds_from_api")]
    resin_recovery_time: u64,
}

#[derive(Debug, Deserialize)]
struct HsrNote {
    current_stamina: u32,
    max_stamina: u32,
    #[serde(deserialize_with = "seconds_from_api")]
    stamina_recover_time: u64,
}

// The API serializes recovery timers as strings; accept numbers too.
fn seconds_from_api<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

pub struct HoyoClient {
    config: Config,
    http: reqwest::Client,
    headers: HeaderMap,
}

impl HoyoClient {
    pub fn new(config: Config, http: reqwest::Client) -> Self {
        Self {
            headers: base_headers(),
            config,
            http,
        }
    }

    pub async fn fetch_genshin_notes(&self) -> Result<ApiReply, FetchError> {
        let server = genshin_server(&self.config.uid);
        self.fetch_notes(constants::GENSHIN_NOTES_URL, server, &self.config.uid)
            .await
    }

    pub async fn fetch_hsr_notes(&self) -> Result<ApiReply, FetchError> {
        let Some(uid) = self.config.effective_hsr_uid() else {
            return Ok(ApiReply::not_configured());
        };
        let server = hsr_server(uid);
        self.fetch_notes(constants::HSR_NOTES_URL, server, uid).await
    }

    async fn fetch_notes(
        &self,
        url: &str,
        server: &str,
        role_id: &str,
    ) -> Result<ApiReply, FetchError> {
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .header(
                COOKIE,
                format!(
                    "ltoken_v2={}; ltuid_v2={}",
                    self.config.ltoken, self.config.ltuid
                ),
            )
            .header("DS", ds::generate())
            .query(&[("server", server), ("role_id", role_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn base_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert(
        "x-rpc-client_type",
        HeaderValue::from_static(constants::RPC_CLIENT_TYPE),
    );
    headers.insert(
        "x-rpc-app_version",
        HeaderValue::from_static(constants::RPC_APP_VERSION),
    );
    headers.insert(
        "x-rpc-language",
        HeaderValue::from_static(constants::RPC_LANGUAGE),
    );
    headers.insert(
        ORIGIN,
        HeaderValue::from_static(constants::HOYOLAB_ACT_ORIGIN),
    );
    headers.insert(
        REFERER,
        HeaderValue::from_static(constants::HOYOLAB_ACT_ORIGIN),
    );
    headers
}

pub fn genshin_server(uid: &str) -> &'static str {
    match uid.chars().next() {
        Some('1' | '2') => "cn_gf01",
        Some('5') => "cn_qd01",
        Some('6') => "os_usa",
        Some('7') => "os_euro",
        Some('8') => "os_asia",
        Some('9') => "os_cht",
        _ => "os_usa",
    }
}

pub fn hsr_server(uid: &str) -> &'static str {
    match uid.chars().next() {
        Some('1' | '2') => "prod_gf_cn",
        Some('5') => "prod_qd_cn",
        Some('6') => "prod_official_usa",
        Some('7') => "prod_official_eur",
        Some('8') => "prod_official_asia",
        Some('9') => "prod_official_cht",
        _ => "prod_official_usa",
    }
}

pub fn genshin_state(result: Result<ApiReply, FetchError>) -> PanelState {
    note_state(result, "genshin", parse_genshin)
}

pub fn hsr_state(result: Result<ApiReply, FetchError>) -> PanelState {
    note_state(result, "hsr", parse_hsr)
}

fn note_state(
    result: Result<ApiReply, FetchError>,
    game: &'static str,
    parse: fn(&Value) -> Result<ResourceSnapshot, FetchError>,
) -> PanelState {
    let reply = match result {
        Ok(reply) => reply,
        Err(e) => {
            tracing::warn!("{game} fetch failed: {e}");
            return PanelState::NetworkError;
        }
    };

    if reply.retcode == constants::RETCODE_NOT_CONFIGURED
        && reply.message == constants::HSR_NOT_CONFIGURED_MESSAGE
    {
        return PanelState::NotConfigured;
    }

    if reply.retcode != constants::RETCODE_OK {
        tracing::warn!("{game} API error {}: {}", reply.retcode, reply.message);
        if reply.message.contains(constants::DATA_NOT_PUBLIC_MARKER) {
            return PanelState::DataNotPublic;
        }
        return PanelState::ApiError;
    }

    match reply.data.as_ref().map(parse) {
        Some(Ok(snapshot)) => PanelState::Ready(snapshot),
        Some(Err(e)) => {
            tracing::warn!("{game} note did not decode: {e}");
            PanelState::NetworkError
        }
        None => {
            tracing::warn!("{game} reply carried no data");
            PanelState::NetworkError
        }
    }
}

fn parse_genshin(data: &Value) -> Result<ResourceSnapshot, FetchError> {
    let note: GenshinDailyNote = serde_json::from_value(data.clone())?;
    Ok(ResourceSnapshot {
        current: note.current_resin,
        max: note.max_resin,
        recovery_seconds: note.resin_recovery_time,
    })
}

fn parse_hsr(data: &Value) -> Result<ResourceSnapshot, FetchError> {
    let note: HsrNote = serde_json::from_value(data.clone())?;
    Ok(ResourceSnapshot {
        current: note.current_stamina,
        max: note.max_stamina,
        recovery_seconds: note.stamina_recover_time,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reply(value: Value) -> ApiReply {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn shard_depends_only_on_first_character() {
        assert_eq!(genshin_server("800000001"), genshin_server("899999999"));
        assert_eq!(hsr_server("600000001"), hsr_server("612345678"));
    }

    #[test]
    fn shard_tables_cover_listed_prefixes() {
        assert_eq!(genshin_server("100000001"), "cn_gf01");
        assert_eq!(genshin_server("200000001"), "cn_gf01");
        assert_eq!(genshin_server("500000001"), "cn_qd01");
        assert_eq!(genshin_server("600000001"), "os_usa");
        assert_eq!(genshin_server("700000001"), "os_euro");
        assert_eq!(genshin_server("800000001"), "os_asia");
        assert_eq!(genshin_server("900000001"), "os_cht");
        assert_eq!(hsr_server("100000001"), "prod_gf_cn");
        assert_eq!(hsr_server("700000001"), "prod_official_eur");
    }

    #[test]
    fn unknown_prefix_falls_back_to_default_shard() {
        assert_eq!(genshin_server("300000001"), "os_usa");
        assert_eq!(genshin_server("400000001"), "os_usa");
        assert_eq!(genshin_server(""), "os_usa");
        assert_eq!(hsr_server("000000001"), "prod_official_usa");
        assert_eq!(hsr_server(""), "prod_official_usa");
    }

    #[test]
    fn success_reply_yields_ready_snapshot() {
        let state = genshin_state(Ok(reply(json!({
            "retcode": 0,
            "message": "OK",
            "data": {
                "current_resin": 40,
                "max_resin": 160,
                "resin_recovery_time": "3661"
            }
        }))));

        let PanelState::Ready(snapshot) = state else {
            panic!("expected Ready, got {state:?}");
        };
        assert_eq!(snapshot.current, 40);
        assert_eq!(snapshot.max, 160);
        assert_eq!(snapshot.recovery_seconds, 3661);
    }

    #[test]
    fn numeric_recovery_time_also_decodes() {
        let state = hsr_state(Ok(reply(json!({
            "retcode": 0,
            "message": "OK",
            "data": {
                "current_stamina": 43,
                "max_stamina": 240,
                "stamina_recover_time": 2400
            }
        }))));
        assert!(matches!(state, PanelState::Ready(_)));
    }

    #[test]
    fn data_not_public_message_is_classified_separately() {
        let state = hsr_state(Ok(reply(json!({
            "retcode": -1,
            "message": "Data is not public",
            "data": null
        }))));
        assert!(matches!(state, PanelState::DataNotPublic));

        let state = hsr_state(Ok(reply(json!({
            "retcode": 10102,
            "message": "Data is not public for the user",
            "data": null
        }))));
        assert!(matches!(state, PanelState::DataNotPublic));
    }

    #[test]
    fn other_api_errors_are_generic() {
        let state = genshin_state(Ok(reply(json!({
            "retcode": -100,
            "message": "Please login",
            "data": null
        }))));
        assert!(matches!(state, PanelState::ApiError));
    }

    #[test]
    fn transport_failure_maps_to_network_error() {
        let state = genshin_state(Err(FetchError::Status(
            reqwest::StatusCode::BAD_GATEWAY,
        )));
        assert!(matches!(state, PanelState::NetworkError));
    }

    #[test]
    fn malformed_data_is_network_class() {
        let state = genshin_state(Ok(reply(json!({
            "retcode": 0,
            "message": "OK",
            "data": { "current_resin": "forty" }
        }))));
        assert!(matches!(state, PanelState::NetworkError));
    }

    #[test]
    fn missing_data_on_success_is_network_class() {
        let state = genshin_state(Ok(reply(json!({
            "retcode": 0,
            "message": "OK",
            "data": null
        }))));
        assert!(matches!(state, PanelState::NetworkError));
    }

    #[test]
    fn games_are_classified_independently() {
        let failed = genshin_state(Err(FetchError::Status(
            reqwest::StatusCode::GATEWAY_TIMEOUT,
        )));
        let succeeded = hsr_state(Ok(reply(json!({
            "retcode": 0,
            "message": "OK",
            "data": {
                "current_stamina": 120,
                "max_stamina": 240,
                "stamina_recover_time": "21600"
            }
        }))));
        assert!(matches!(failed, PanelState::NetworkError));
        assert!(matches!(succeeded, PanelState::Ready(_)));
    }

    #[tokio::test]
    async fn unconfigured_hsr_uid_short_circuits_without_network() {
        let config = Config {
            ltoken: "tok".to_string(),
            ltuid: "123".to_string(),
            uid: String::new(),
            hsr_uid: None,
        };
        let client = HoyoClient::new(config, reqwest::Client::new());

        let reply = client.fetch_hsr_notes().await.unwrap();
        assert_eq!(reply.retcode, constants::RETCODE_NOT_CONFIGURED);
        assert_eq!(reply.message, constants::HSR_NOT_CONFIGURED_MESSAGE);
        assert!(reply.data.is_none());

        assert!(matches!(
            hsr_state(Ok(reply)),
            PanelState::NotConfigured
        ));
    }
}
