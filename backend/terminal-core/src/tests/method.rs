use crate::jsonrpc::dispatch_name;
use crate::rpc::RpcMethod;

/// **VALUE**: Every wire method of the terminal resolves to a dispatch entry.
///
/// **BUG THIS CATCHES**: Would catch a renamed enum variant silently dropping a method
/// from the surface.
#[test]
fn given_wire_method_names_when_resolved_then_each_maps_to_a_method() {
    let wire = [
        ("inlet.open", RpcMethod::InletOpen),
        ("inlet.close", RpcMethod::InletClose),
        ("outlet.close", RpcMethod::OutletClose),
        ("eval.new", RpcMethod::EvalNew),
        ("eval.spectrum", RpcMethod::EvalSpectrum),
        ("eval.hydro", RpcMethod::EvalHydro),
        ("eval.return", RpcMethod::EvalReturn),
        ("eval.store", RpcMethod::EvalStore),
        ("storage.extract", RpcMethod::StorageExtract),
        ("storage.occupy", RpcMethod::StorageOccupy),
        ("storage.release", RpcMethod::StorageRelease),
        ("status", RpcMethod::Status),
        ("call", RpcMethod::Call),
        ("hardware", RpcMethod::Hardware),
    ];

    for (name, expected) in wire {
        let method: RpcMethod = dispatch_name(name).parse().unwrap();
        assert_eq!(method, expected, "{name}");
    }
}

#[test]
fn given_unknown_dispatch_name_when_parsed_then_returns_name() {
    assert_eq!("EvalExplode".parse::<RpcMethod>(), Err("EvalExplode".to_string()));
}
