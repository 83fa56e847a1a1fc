#![cfg(target_arch = "wasm32")]

use js_sys::Function;
use wallet_bridge_wasm::{
    JsPlatformProvider, JsWalletSdkProvider, SessionPhase, WalletSession, format_chain_id,
    parse_chain_id,
};
use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";

fn sdk() -> JsWalletSdkProvider {
    let body = format!(
        r#"
        const client = {{
            account: null,
            chainId: '0x89',
            connect(cb) {{
                this.account = '{ACCOUNT}';
                cb({{ type: 'item', value: '{ACCOUNT}' }});
            }},
            sendRequest(req, cb) {{
                return Promise.resolve('0xsig-' + req.params[1]);
            }},
            connectAndSign(msg, cb) {{
                cb({{ type: 'error', value: {{ code: 4001, message: 'User rejected' }} }});
            }},
            getEthAccounts(cb) {{ cb(['{ACCOUNT}']); }},
            getChainId(cb) {{ cb('0x89'); }},
        }};
        return client;
        "#
    );
    JsWalletSdkProvider::new(Function::new_with_args("spec", &body))
}

/// Client whose methods return their results instead of calling back.
fn returning_sdk() -> JsWalletSdkProvider {
    let body = format!(
        r#"
        return {{
            account: null,
            chainId: 137,
            connect() {{
                this.account = '{ACCOUNT}';
                return {{ type: 'item', value: '{ACCOUNT}' }};
            }},
            sendRequest(req) {{ return '0xsig-' + req.params[1]; }},
            connectAndSign(msg) {{ return {{ type: 'error', message: 'User rejected', code: 4001 }}; }},
            getEthAccounts() {{ return ['{ACCOUNT}']; }},
            getChainId() {{ return '0x89'; }},
        }};
        "#
    );
    JsWalletSdkProvider::new(Function::new_with_args("spec", &body))
}

fn platform() -> JsPlatformProvider {
    JsPlatformProvider::new(
        "com.example.app".to_string(),
        Function::new_no_args(
            "return [{ package: 'com.example.app', schemes: ['myapp'], hosts: ['mmsdk'], browsable: true }];",
        ),
        Function::new_with_args("uri", "return ['com.example.app'];"),
        Some(Function::new_with_args("uri, flags", "globalThis.lastOpened = uri;")),
    )
}

#[wasm_bindgen_test]
fn chain_id_helpers() {
    assert_eq!(parse_chain_id("0x89").unwrap(), 137);
    assert_eq!(parse_chain_id("137").unwrap(), 137);
    assert!(parse_chain_id("").is_err());
    assert_eq!(format_chain_id(137), "0x89");
}

#[wasm_bindgen_test]
async fn connect_then_sign_through_js_client() {
    let session = WalletSession::new(sdk(), platform(), JsValue::UNDEFINED).unwrap();
    assert_eq!(session.phase(), SessionPhase::Disconnected);

    let connected = session.connect().await.unwrap();
    assert_eq!(connected.address, ACCOUNT);
    assert_eq!(connected.chain_id, 137);
    assert_eq!(session.get_chain_id(), Some(137));

    let signature = session.sign_message("hello".to_string()).await.unwrap();
    assert_eq!(signature, "0xsig-hello");
    assert_eq!(session.phase(), SessionPhase::Connected);
}

#[wasm_bindgen_test]
async fn wallet_error_message_reaches_js() {
    let session = WalletSession::new(sdk(), platform(), JsValue::UNDEFINED).unwrap();

    let err = session
        .connect_sign("n1".to_string(), 1_700_000_000)
        .await
        .unwrap_err();
    assert_eq!(err.as_string().as_deref(), Some("User rejected"));
}

#[wasm_bindgen_test]
async fn synchronous_return_values_resolve_operations() {
    let session = WalletSession::new(returning_sdk(), platform(), JsValue::UNDEFINED).unwrap();

    let connected = session.connect().await.unwrap();
    assert_eq!(connected.address, ACCOUNT);
    assert_eq!(connected.chain_id, 137);

    let signature = session.sign_message("hello".to_string()).await.unwrap();
    assert_eq!(signature, "0xsig-hello");

    let err = session
        .connect_sign("n1".to_string(), 1_700_000_000)
        .await
        .unwrap_err();
    assert_eq!(err.as_string().as_deref(), Some("User rejected"));
}
