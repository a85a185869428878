// Request dispatch: method validation, containers for the format and token
// fields, status-only methods and response classification.

#[cfg(test)]
mod test {
    use http::Method;
    use httpmock::Method::{DELETE, GET, HEAD, OPTIONS, POST, PUT};
    use httpmock::MockServer;
    use serde_json::Map;
    use std::thread;

    use crate::client::ArcgisRest;
    use crate::config::service::ServiceConfig;
    use crate::connection::{Dispatch, Params, RequestBody, UploadFile};
    use crate::error::ArcgisError;
    use crate::tests::common::{json, mock_config, mock_generate, mock_info};

    /// Client whose token for the mock server is already issued.
    fn authenticated(server: &MockServer) -> ArcgisRest {
        let token_url = server.url("/arcgis/tokens/generateToken");
        mock_info(server, "/arcgis/rest/info", &token_url, None);
        mock_generate(server, "/arcgis/tokens/generateToken", "tok-1");
        ArcgisRest::new(mock_config(server))
    }

    fn anonymous(server: &MockServer) -> ArcgisRest {
        let config = ServiceConfig::new(format!("127.0.0.1:{}", server.port()))
            .with_https(false)
            .with_verify_ssl(false);
        ArcgisRest::new(config)
    }

    #[test]
    fn unsupported_method_is_rejected_before_sending() {
        let server = MockServer::start();
        let any = server.mock(|_, then| {
            then.status(200);
        });

        let err = authenticated(&server)
            .arcgis()
            .request(Method::TRACE, "services", RequestBody::default(), false)
            .unwrap_err();

        match err {
            ArcgisError::InvalidMethod { method, path } => {
                assert_eq!(method, "TRACE");
                assert_eq!(path, "services");
            }
            other => panic!("unexpected error: {other}"),
        }
        any.assert_calls(0);
    }

    #[test]
    fn head_and_options_never_acquire_tokens() {
        let server = MockServer::start();
        let info = server.mock(|when, then| {
            when.method(GET).path("/arcgis/rest/info");
            then.status(200).json_body(json!({}));
        });
        let head = server.mock(|when, then| {
            when.method(HEAD).path("/arcgis/rest/services");
            then.status(200);
        });
        let options = server.mock(|when, then| {
            when.method(OPTIONS).path("/arcgis/rest/services");
            then.status(204).header("Allow", "GET, POST");
        });

        let connection = ArcgisRest::new(mock_config(&server)).arcgis();
        let outcome = connection.head("services", false).unwrap();
        assert_eq!(outcome.status, 200);
        assert!(outcome.body.is_null());

        let outcome = connection.options("services", false).unwrap();
        assert_eq!(outcome.status, 204);
        assert_eq!(outcome.headers.get("allow").unwrap(), "GET, POST");

        head.assert();
        options.assert();
        info.assert_calls(0);
    }

    #[test]
    fn head_reports_http_errors() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(HEAD).path("/arcgis/rest/missing");
            then.status(404);
        });

        let err = anonymous(&server).arcgis().head("missing", false).unwrap_err();
        assert!(matches!(err, ArcgisError::Transport { status: Some(404), .. }), "{err}");
    }

    #[test]
    fn anonymous_requests_only_carry_format() {
        let server = MockServer::start();
        let info = server.mock(|when, then| {
            when.method(GET).path("/arcgis/rest/info");
            then.status(200).json_body(json!({}));
        });
        let services = server.mock(|when, then| {
            when.method(GET)
                .path("/arcgis/rest/services")
                .query_param("f", "json")
                .query_param("folder", "Hosted");
            then.status(200).json_body(json!({"services": []}));
        });

        let params = Params::from([("folder".to_owned(), "Hosted".to_owned())]);
        anonymous(&server).arcgis().get("services", Some(params), false).unwrap();

        services.assert();
        info.assert_calls(0);
    }

    #[test]
    fn post_without_payload_sends_token_as_form() {
        let server = MockServer::start();
        let edit = server.mock(|when, then| {
            when.method(POST)
                .path("/arcgis/admin/services/Hosted/Parcels.MapServer/stop")
                .header("content-type", "application/x-www-form-urlencoded")
                .body_includes("f=json")
                .body_includes("token=tok-1");
            then.status(200).json_body(json!({"status": "success"}));
        });

        authenticated(&server)
            .arcgis()
            .post("/services/Hosted/Parcels.MapServer/stop", RequestBody::default(), true)
            .unwrap();

        edit.assert();
    }

    #[test]
    fn query_params_take_priority_over_form() {
        let server = MockServer::start();
        let update = server.mock(|when, then| {
            when.method(PUT)
                .path("/arcgis/rest/items/1")
                .query_param("token", "tok-1")
                .query_param("f", "json")
                .body_includes("title=Parcels");
            then.status(200).json_body(json!({"success": true}));
        });

        let body = RequestBody {
            params: Some(Params::new()),
            data: Some(Params::from([("title".to_owned(), "Parcels".to_owned())])),
            ..Default::default()
        };
        authenticated(&server).arcgis().put("items/1", body, false).unwrap();

        update.assert();
    }

    #[test]
    fn json_payload_receives_format_and_token() {
        let server = MockServer::start();
        let create = server.mock(|when, then| {
            when.method(POST)
                .path("/arcgis/rest/items")
                .header("content-type", "application/json")
                .body_includes("\"token\":\"tok-1\"")
                .body_includes("\"f\":\"json\"")
                .body_includes("\"title\":\"Parcels\"");
            then.status(200).json_body(json!({"id": "42"}));
        });

        let mut json = Map::new();
        json.insert("title".to_owned(), json!("Parcels"));
        let outcome = authenticated(&server)
            .arcgis()
            .post("items", RequestBody::json(json), false)
            .unwrap();

        create.assert();
        assert_eq!(outcome.body["id"], "42");
    }

    #[test]
    fn files_are_uploaded_as_multipart() {
        let server = MockServer::start();
        let upload = server.mock(|when, then| {
            when.method(POST)
                .path("/arcgis/rest/uploads/upload")
                .header_exists("content-type")
                .body_includes("filename=\"parcels.csv\"")
                .body_includes("id,name")
                .body_includes("name=\"token\"")
                .body_includes("tok-1");
            then.status(200).json_body(json!({"success": true, "item": {"itemID": "i1"}}));
        });

        let body = RequestBody::form(Params::new())
            .with_file(UploadFile::new("file", "parcels.csv", b"id,name\n1,A\n".to_vec()).with_mime("text/csv"));
        let outcome = authenticated(&server)
            .arcgis()
            .post("uploads/upload", body, false)
            .unwrap();

        upload.assert();
        assert_eq!(outcome.body["item"]["itemID"], "i1");
    }

    #[test]
    fn json_payload_travels_with_uploaded_files() {
        let server = MockServer::start();
        let upload = server.mock(|when, then| {
            when.method(POST)
                .path("/arcgis/rest/content/addItem")
                .body_includes("filename=\"parcels.csv\"")
                .body_includes("name=\"title\"")
                .body_includes("Parcels")
                .body_includes("name=\"token\"")
                .body_includes("tok-1")
                .body_includes("name=\"f\"");
            then.status(200).json_body(json!({"success": true, "id": "i2"}));
        });

        let mut json = Map::new();
        json.insert("title".to_owned(), json!("Parcels"));
        let body = RequestBody::json(json).with_file(UploadFile::new("file", "parcels.csv", b"id,name\n".to_vec()));
        let outcome = authenticated(&server)
            .arcgis()
            .post("content/addItem", body, false)
            .unwrap();

        upload.assert();
        assert_eq!(outcome.body["id"], "i2");
    }

    #[test]
    fn delete_sends_token_in_query() {
        let server = MockServer::start();
        let delete = server.mock(|when, then| {
            when.method(DELETE)
                .path("/arcgis/rest/items/1")
                .query_param("token", "tok-1");
            then.status(200).json_body(json!({"success": true}));
        });

        authenticated(&server).arcgis().delete("items/1", false).unwrap();

        delete.assert();
    }

    #[test]
    fn error_in_body_is_application_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/arcgis/rest/services/Missing");
            then.status(200).json_body(json!({
                "error": {"code": 499, "message": "Token Required", "details": []}
            }));
        });

        let err = anonymous(&server)
            .arcgis()
            .get("services/Missing", None, false)
            .unwrap_err();

        match &err {
            ArcgisError::Application { code, message, url, action, .. } => {
                assert_eq!(code, "499");
                assert_eq!(message, "Token Required");
                assert!(url.contains("/arcgis/rest/services/Missing"));
                assert_eq!(action, "executing a get request");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().contains("499: Token Required"));
    }

    #[test]
    fn unsuccessful_body_is_application_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/arcgis/rest/items/1/delete");
            then.status(200).json_body(json!({"success": false}));
        });

        let err = anonymous(&server)
            .arcgis()
            .post("items/1/delete", RequestBody::default(), false)
            .unwrap_err();

        assert!(matches!(err, ArcgisError::Application { ref code, .. } if code == "X"), "{err}");
    }

    #[test]
    fn non_json_body_fails_to_decode() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/arcgis/rest/services");
            then.status(200).body("<html></html>");
        });

        let err = anonymous(&server).arcgis().get("services", None, false).unwrap_err();
        assert!(matches!(err, ArcgisError::Decode { .. }), "{err}");
    }

    #[test]
    fn refused_connection_is_transport_error() {
        // nothing listens on the discard port
        let config = ServiceConfig::new("127.0.0.1:9").with_https(false);
        let err = ArcgisRest::new(config).arcgis().get("services", None, false).unwrap_err();
        assert!(matches!(err, ArcgisError::Transport { status: None, .. }), "{err}");
    }

    #[test]
    fn connections_dispatch_concurrently() {
        let server = MockServer::start();
        let services = server.mock(|when, then| {
            when.method(GET).path("/arcgis/rest/services").query_param("token", "tok-1");
            then.status(200).json_body(json!({"services": []}));
        });

        let client = authenticated(&server);
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let connection = client.arcgis();
                thread::spawn(move || connection.get("services", None, false).map(|outcome| outcome.status))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), 200);
        }
        services.assert_calls(4);
    }
}
