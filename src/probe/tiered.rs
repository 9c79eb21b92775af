//! Tiered prober
//!
//! Evaluates one endpoint by trying a prioritized list of ports, and for
//! each port a prioritized list of probe methods, stopping at the first
//! success. Connection-specific methods come before looser reachability
//! signals, and a host/port pair is never re-probed once it has answered.

use crate::descriptor::Endpoint;
use crate::probe::methods::{ExternalProbe, IcmpProbe, ProbeMethod, ProbeProtocol, SocketProbe};
use crate::validator::ValidationOptions;

/// Tiered reachability evaluator for a single endpoint
pub struct TieredProber {
    methods: Vec<Box<dyn ProbeMethod>>,
}

impl TieredProber {
    /// Create a prober with the standard method tier: external scanner
    /// first (when present on the host), then TCP connect, then ICMP echo.
    pub fn new() -> Self {
        Self::with_external_protocol(ProbeProtocol::default())
    }

    /// Create the standard tier with the external scanner probing the
    /// given protocol instead of plain TCP.
    pub fn with_external_protocol(protocol: ProbeProtocol) -> Self {
        Self::with_methods(vec![
            Box::new(ExternalProbe::new(protocol)),
            Box::new(SocketProbe),
            Box::new(IcmpProbe),
        ])
    }

    /// Create a prober with an explicit method tier. Methods are tried in
    /// the given order at every port.
    pub fn with_methods(methods: Vec<Box<dyn ProbeMethod>>) -> Self {
        Self { methods }
    }

    /// Evaluate reachability of one endpoint.
    ///
    /// Returns true as soon as any method reports success at any port in
    /// the plan, false once every method at every port has failed.
    pub async fn evaluate(&self, endpoint: &Endpoint, options: &ValidationOptions) -> bool {
        let timeout = options.timeout();

        for port in port_plan(endpoint.port, &options.fallback_ports) {
            for method in &self.methods {
                if !method.available() {
                    continue;
                }

                let outcome = method.probe(&endpoint.host, port, timeout).await;
                if outcome.succeeded {
                    log::debug!(
                        "{}:{} reachable via {} (rtt {:?})",
                        endpoint.host,
                        port,
                        outcome.method,
                        outcome.rtt_ms
                    );
                    return true;
                }
                log::debug!("{}:{} no answer via {}", endpoint.host, port, outcome.method);
            }
        }

        false
    }
}

impl Default for TieredProber {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the ordered, de-duplicated port list for one evaluation: the
/// descriptor's own port first (when it has one), then the fallback ports
/// in their configured order, skipping ports already present.
pub fn port_plan(own_port: Option<u16>, fallback_ports: &[u16]) -> Vec<u16> {
    let mut plan = Vec::with_capacity(1 + fallback_ports.len());
    // Only a positive own port enters the plan; 0 means unspecified.
    if let Some(port) = own_port.filter(|&port| port > 0) {
        plan.push(port);
    }
    for &port in fallback_ports {
        if port > 0 && !plan.contains(&port) {
            plan.push(port);
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::methods::{ProbeMethodKind, ProbeOutcome};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted probe method: succeeds only on the listed ports, records
    /// every (kind, port) attempt for order assertions.
    struct ScriptedProbe {
        kind: ProbeMethodKind,
        open_ports: Vec<u16>,
        usable: bool,
        calls: Arc<Mutex<Vec<(ProbeMethodKind, u16)>>>,
    }

    impl ScriptedProbe {
        fn new(
            kind: ProbeMethodKind,
            open_ports: Vec<u16>,
            calls: Arc<Mutex<Vec<(ProbeMethodKind, u16)>>>,
        ) -> Self {
            Self {
                kind,
                open_ports,
                usable: true,
                calls,
            }
        }

        fn unusable(mut self) -> Self {
            self.usable = false;
            self
        }
    }

    #[async_trait]
    impl ProbeMethod for ScriptedProbe {
        fn kind(&self) -> ProbeMethodKind {
            self.kind
        }

        fn available(&self) -> bool {
            self.usable
        }

        async fn probe(&self, _host: &str, port: u16, _timeout: Duration) -> ProbeOutcome {
            self.calls.lock().unwrap().push((self.kind, port));
            if self.open_ports.contains(&port) {
                ProbeOutcome::success(self.kind, Some(1.0))
            } else {
                ProbeOutcome::failure(self.kind)
            }
        }
    }

    fn endpoint(port: Option<u16>) -> Endpoint {
        Endpoint::new("example.test".to_string(), port)
    }

    fn options(fallback_ports: Vec<u16>) -> ValidationOptions {
        ValidationOptions::default().with_fallback_ports(fallback_ports)
    }

    #[test]
    fn test_port_plan_own_port_first() {
        assert_eq!(port_plan(Some(8080), &[443, 80, 53]), vec![8080, 443, 80, 53]);
    }

    #[test]
    fn test_port_plan_deduplicates() {
        assert_eq!(port_plan(Some(443), &[443, 80, 53]), vec![443, 80, 53]);
        assert_eq!(port_plan(None, &[80, 80, 443]), vec![80, 443]);
    }

    #[test]
    fn test_port_plan_unspecified_port() {
        assert_eq!(port_plan(None, &[443, 80]), vec![443, 80]);
        assert!(port_plan(None, &[]).is_empty());
    }

    #[test]
    fn test_port_plan_ignores_port_zero() {
        assert_eq!(port_plan(Some(0), &[443, 80]), vec![443, 80]);
        assert_eq!(port_plan(Some(8080), &[0, 443]), vec![8080, 443]);
    }

    #[tokio::test]
    async fn test_evaluate_succeeds_on_own_port() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let prober = TieredProber::with_methods(vec![Box::new(ScriptedProbe::new(
            ProbeMethodKind::Socket,
            vec![9999],
            calls.clone(),
        ))]);

        assert!(prober.evaluate(&endpoint(Some(9999)), &options(vec![80])).await);
        // First success short-circuits: the fallback port is never probed.
        assert_eq!(&*calls.lock().unwrap(), &[(ProbeMethodKind::Socket, 9999)]);
    }

    #[tokio::test]
    async fn test_evaluate_falls_back_to_open_port() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let prober = TieredProber::with_methods(vec![Box::new(ScriptedProbe::new(
            ProbeMethodKind::Socket,
            vec![80],
            calls.clone(),
        ))]);

        assert!(prober.evaluate(&endpoint(Some(9999)), &options(vec![80])).await);
        assert_eq!(
            &*calls.lock().unwrap(),
            &[(ProbeMethodKind::Socket, 9999), (ProbeMethodKind::Socket, 80)]
        );
    }

    #[tokio::test]
    async fn test_evaluate_method_priority_within_port() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let prober = TieredProber::with_methods(vec![
            Box::new(ScriptedProbe::new(ProbeMethodKind::External, vec![], calls.clone())),
            Box::new(ScriptedProbe::new(ProbeMethodKind::Socket, vec![443], calls.clone())),
            Box::new(ScriptedProbe::new(ProbeMethodKind::Icmp, vec![443], calls.clone())),
        ]);

        assert!(prober.evaluate(&endpoint(Some(443)), &options(vec![])).await);
        // External fails first, socket succeeds, ICMP is never reached.
        assert_eq!(
            &*calls.lock().unwrap(),
            &[(ProbeMethodKind::External, 443), (ProbeMethodKind::Socket, 443)]
        );
    }

    #[tokio::test]
    async fn test_evaluate_skips_unavailable_methods() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let prober = TieredProber::with_methods(vec![
            Box::new(
                ScriptedProbe::new(ProbeMethodKind::External, vec![443], calls.clone()).unusable(),
            ),
            Box::new(ScriptedProbe::new(ProbeMethodKind::Socket, vec![443], calls.clone())),
        ]);

        assert!(prober.evaluate(&endpoint(Some(443)), &options(vec![])).await);
        assert_eq!(&*calls.lock().unwrap(), &[(ProbeMethodKind::Socket, 443)]);
    }

    #[tokio::test]
    async fn test_evaluate_all_exhausted() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let prober = TieredProber::with_methods(vec![Box::new(ScriptedProbe::new(
            ProbeMethodKind::Socket,
            vec![],
            calls.clone(),
        ))]);

        assert!(!prober.evaluate(&endpoint(Some(9999)), &options(vec![443, 80])).await);
        assert_eq!(calls.lock().unwrap().len(), 3);
    }
}
