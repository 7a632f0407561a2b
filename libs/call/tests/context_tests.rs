use orbit_call::{CallContext, CallMode, EndpointAddr, ResponseFuture, ServiceUrl};
use std::collections::HashMap;
use std::net::IpAddr;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

// Side inference

#[test]
fn provider_side_when_ports_differ() {
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("10.20.30.40", 8972));
    ctx.set_remote_address(EndpointAddr::resolved(ip("10.20.30.40"), 51234));

    assert!(ctx.is_provider_side());
    assert!(!ctx.is_consumer_side());
}

#[test]
fn provider_side_when_hosts_differ() {
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("10.20.30.40", 8972));
    ctx.set_remote_address(EndpointAddr::resolved(ip("10.20.30.41"), 8972));

    assert!(ctx.is_provider_side());
    assert!(!ctx.is_consumer_side());
}

#[test]
fn consumer_side_when_url_matches_remote() {
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("10.20.30.40", 8972));
    ctx.set_remote_address(EndpointAddr::resolved(ip("10.20.30.40"), 8972));

    assert!(ctx.is_consumer_side());
    assert!(!ctx.is_provider_side());
}

#[test]
fn side_detection_requires_url_and_remote_address() {
    let mut ctx = CallContext::new();
    assert!(!ctx.is_provider_side());
    assert!(!ctx.is_consumer_side());

    ctx.set_url(ServiceUrl::new("10.20.30.40", 8972));
    assert!(!ctx.is_provider_side());
    assert!(!ctx.is_consumer_side());

    let mut ctx = CallContext::new();
    ctx.set_remote_address(EndpointAddr::resolved(ip("10.20.30.40"), 8972));
    assert!(!ctx.is_provider_side());
    assert!(!ctx.is_consumer_side());
}

#[test]
fn loopback_forms_compare_equal() {
    // "localhost" in the url and a resolved 127.0.0.1 remote normalize to
    // the same representative value
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("localhost", 8972));
    ctx.set_remote_address(EndpointAddr::resolved(ip("127.0.0.1"), 8972));

    assert!(ctx.is_consumer_side());
    assert!(!ctx.is_provider_side());
}

#[test]
fn unresolved_remote_compares_by_literal_host() {
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("svc-a.internal", 8972));
    ctx.set_remote_address(EndpointAddr::unresolved("svc-a.internal", 8972));
    assert!(ctx.is_consumer_side());

    ctx.set_remote_address(EndpointAddr::unresolved("svc-b.internal", 8972));
    assert!(ctx.is_provider_side());
}

#[test]
fn blank_url_ip_is_not_loopback_normalized() {
    // a blank ip compares as itself rather than as the detected local
    // host, so it never coincides with a loopback remote
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("", 8972));
    ctx.set_remote_address(EndpointAddr::resolved(ip("127.0.0.1"), 8972));

    assert!(ctx.is_provider_side());
    assert!(!ctx.is_consumer_side());
}

#[test]
fn side_predicates_never_both_true() {
    let cases = [
        ("10.0.0.1", 80, "10.0.0.1", 80),
        ("10.0.0.1", 80, "10.0.0.1", 81),
        ("10.0.0.1", 80, "10.0.0.2", 80),
        ("localhost", 443, "127.0.0.1", 443),
    ];
    for (url_ip, url_port, remote_ip, remote_port) in cases {
        let mut ctx = CallContext::new();
        ctx.set_url(ServiceUrl::new(url_ip, url_port));
        ctx.set_remote_address(EndpointAddr::resolved(ip(remote_ip), remote_port));
        assert!(
            !(ctx.is_provider_side() && ctx.is_consumer_side()),
            "both sides true for {}:{} vs {}:{}",
            url_ip,
            url_port,
            remote_ip,
            remote_port
        );
    }
}

// Attachments

#[test]
fn attachment_empty_value_removes_key() {
    let mut ctx = CallContext::new();
    ctx.set_attachment("trace-id", "a1b2");
    assert_eq!(ctx.attachment("trace-id"), Some("a1b2"));

    ctx.set_attachment("trace-id", "");
    assert_eq!(ctx.attachment("trace-id"), None);
    assert!(!ctx.attachments().contains_key("trace-id"));
}

#[test]
fn remove_and_clear_attachments() {
    let mut ctx = CallContext::new();
    ctx.set_attachment("a", "1").set_attachment("b", "2");

    ctx.remove_attachment("a");
    assert_eq!(ctx.attachment("a"), None);
    assert_eq!(ctx.attachment("b"), Some("2"));

    ctx.clear_attachments();
    assert!(ctx.attachments().is_empty());

    // removal of an absent key is a no-op
    ctx.remove_attachment("a");
}

#[test]
fn replace_attachments_drops_blank_values() {
    let mut ctx = CallContext::new();
    ctx.set_attachment("old", "stale");

    let mut incoming = HashMap::new();
    incoming.insert("kept".to_string(), "yes".to_string());
    incoming.insert("blank".to_string(), String::new());
    ctx.replace_attachments(incoming);

    assert_eq!(ctx.attachment("old"), None);
    assert_eq!(ctx.attachment("kept"), Some("yes"));
    assert_eq!(ctx.attachment("blank"), None);
    assert_eq!(ctx.attachments().len(), 1);
}

// Values

#[test]
fn values_store_and_downcast() {
    let mut ctx = CallContext::new();
    ctx.set_value("deadline-ms", 1500u64);
    ctx.set_value("label", "diagnostic".to_string());

    assert_eq!(ctx.value::<u64>("deadline-ms"), Some(&1500));
    assert_eq!(ctx.value::<String>("label"), Some(&"diagnostic".to_string()));

    // wrong type reads as absent
    assert_eq!(ctx.value::<u32>("deadline-ms"), None);

    ctx.remove_value("deadline-ms");
    assert_eq!(ctx.value::<u64>("deadline-ms"), None);
    assert!(!ctx.has_value("deadline-ms"));
    assert!(ctx.has_value("label"));
}

// Urls

#[test]
fn urls_synthesized_from_single_url() {
    let mut ctx = CallContext::new();
    assert_eq!(ctx.urls(), None);

    let url = ServiceUrl::new("10.0.0.7", 8972);
    ctx.set_url(url.clone());
    assert_eq!(ctx.urls(), Some(vec![url]));
}

#[test]
fn explicit_urls_take_precedence() {
    let mut ctx = CallContext::new();
    let list = vec![
        ServiceUrl::new("10.0.0.7", 8972),
        ServiceUrl::new("10.0.0.8", 8972),
    ];
    ctx.set_urls(list.clone());
    ctx.set_url(ServiceUrl::new("10.0.0.9", 8972));

    assert_eq!(ctx.urls(), Some(list));
}

// Address formatting

#[test]
fn address_strings_default_to_port_zero() {
    let ctx = CallContext::new();
    assert!(ctx.local_address_string().ends_with(":0"));
    assert_eq!(ctx.remote_address_string(), ":0");
    assert_eq!(ctx.local_port(), 0);
    assert_eq!(ctx.remote_port(), 0);
}

#[test]
fn address_strings_format_host_and_port() {
    let mut ctx = CallContext::new();
    ctx.set_local_address(("svc-a.internal", 8080));
    ctx.set_remote_address(("svc-b.internal", 9090));

    assert_eq!(ctx.local_address_string(), "svc-a.internal:8080");
    assert_eq!(ctx.remote_address_string(), "svc-b.internal:9090");
    assert_eq!(ctx.remote_host_name(), Some("svc-b.internal"));
}

#[test]
fn local_host_falls_back_to_detected_host() {
    let ctx = CallContext::new();
    assert!(!ctx.local_host().is_empty());
    assert!(!ctx.local_host_name().is_empty());
    // the remote side has no such fallback
    assert_eq!(ctx.remote_host(), None);
    assert_eq!(ctx.remote_host_name(), None);
}

#[test]
fn endpoint_parse_clamps_bad_port() {
    assert_eq!(EndpointAddr::parse("svc:notaport").port(), 0);
    assert_eq!(EndpointAddr::parse("svc:70000").port(), 0);
    assert_eq!(EndpointAddr::parse("svc").port(), 0);

    let addr = EndpointAddr::parse("10.0.0.1:8080");
    assert_eq!(addr.port(), 8080);
    assert_eq!(addr.ip(), Some(ip("10.0.0.1")));
    assert_eq!(addr.to_string(), "10.0.0.1:8080");
}

// Pending response

#[tokio::test]
async fn pending_response_take_transfers_ownership() {
    let mut ctx = CallContext::new();
    ctx.set_pending_response(ResponseFuture::ready(7u32));

    let future = ctx.take_pending_response::<u32>().unwrap();
    assert_eq!(future.await.unwrap(), 7);

    // second take finds nothing
    assert!(ctx.take_pending_response::<u32>().is_none());
    assert!(!ctx.has_pending_response());
}

#[test]
fn mistyped_take_leaves_pending_response_attached() {
    let mut ctx = CallContext::new();
    ctx.set_pending_response(ResponseFuture::ready(7u32));

    assert!(ctx.take_pending_response::<String>().is_none());
    assert!(ctx.has_pending_response());
    assert!(ctx.take_pending_response::<u32>().is_some());
}

#[tokio::test]
async fn setting_pending_response_discards_previous() {
    let mut ctx = CallContext::new();
    ctx.set_pending_response(ResponseFuture::ready(1u32));
    ctx.set_pending_response(ResponseFuture::ready(2u32));

    let future = ctx.take_pending_response::<u32>().unwrap();
    assert_eq!(future.await.unwrap(), 2);
}

// Call mode and reset

#[test]
fn call_mode_reads_reserved_attachments() {
    let mut ctx = CallContext::new();
    assert_eq!(ctx.call_mode(), CallMode::Sync);

    ctx.set_attachment("async", "true");
    assert_eq!(ctx.call_mode(), CallMode::Async);

    ctx.set_attachment("return", "false");
    assert_eq!(ctx.call_mode(), CallMode::OneWay);
}

#[test]
fn reset_clears_state_and_is_idempotent() {
    let mut ctx = CallContext::new();
    ctx.set_url(ServiceUrl::new("10.0.0.7", 8972))
        .set_method_name("Arith.Mul")
        .set_attachment("trace-id", "a1b2")
        .set_service_addr("10.0.0.7:8972");
    ctx.set_value("scratch", 1u8);
    ctx.set_pending_response(ResponseFuture::ready(0u32));

    ctx.reset();
    assert_eq!(ctx.url(), None);
    assert_eq!(ctx.method_name(), None);
    assert!(ctx.attachments().is_empty());
    assert_eq!(ctx.service_addr(), None);
    assert!(!ctx.has_value("scratch"));
    assert!(!ctx.has_pending_response());

    ctx.reset();
    assert_eq!(ctx.url(), None);
}
