//! End-to-end resolution over the in-memory transport and content store.

use semver::Version;
use std::collections::BTreeMap;
use std::sync::Arc;
use trellis_actions::ActionRegistry;
use trellis_assembly::AssemblyRegistry;
use trellis_content::{sha256_hex, BlockLoader, ContentStore, InMemoryContentStore};
use trellis_registry::RegistryConfig;
use trellis_resolver::{AssemblyResolver, ResolverConfig};
use trellis_transport::{InMemoryLogTransport, LogTransport};
use trellis_types::{ActionRegistration, BlockDefinition, TopicId};

struct World {
    transport: Arc<InMemoryLogTransport>,
    store: Arc<InMemoryContentStore>,
    actions: Arc<ActionRegistry>,
    loader: Arc<BlockLoader>,
}

impl World {
    fn new() -> Self {
        let transport = Arc::new(InMemoryLogTransport::new());
        let store = Arc::new(InMemoryContentStore::new());
        let action_topic = transport.create_topic();
        let actions = Arc::new(ActionRegistry::attached(
            transport.clone() as Arc<dyn LogTransport>,
            action_topic,
            store.clone() as Arc<dyn ContentStore>,
            RegistryConfig::default(),
        ));
        let loader = Arc::new(BlockLoader::new(store.clone() as Arc<dyn ContentStore>));
        Self {
            transport,
            store,
            actions,
            loader,
        }
    }

    /// Publish an action registration on its own topic, as independent
    /// action authors do.
    async fn publish_action(&self) -> TopicId {
        let topic = self.transport.create_topic();
        let wasm = b"\0asm demo".to_vec();
        let registration = ActionRegistration {
            hash: sha256_hex(b"interface"),
            wasm_hash: sha256_hex(&wasm),
            artifact_topic: self.store.store(wasm).await.unwrap(),
            info_topic: None,
        };
        let payload =
            trellis_types::encode_envelope(&trellis_types::ActionOperation::Register(registration))
                .unwrap();
        self.transport.append_as(&topic, "0.0.50", payload).unwrap();
        topic
    }

    /// Publish a block definition + template pair into content storage.
    async fn publish_block(&self, name: &str, template: &str) -> TopicId {
        let (template_topic, digest) = self.loader.store_template(template).await.unwrap();
        let definition = BlockDefinition {
            name: name.to_string(),
            template_topic,
            template_digest: Some(digest),
            attributes: None,
            children: vec![],
        };
        self.loader.store_definition(&definition).await.unwrap()
    }

    fn assembly_registry(&self, topic: &TopicId) -> Arc<AssemblyRegistry> {
        Arc::new(AssemblyRegistry::attached(
            self.transport.clone() as Arc<dyn LogTransport>,
            topic.clone(),
            RegistryConfig::default(),
        ))
    }

    fn resolver(&self, assemblies: Arc<AssemblyRegistry>) -> AssemblyResolver {
        AssemblyResolver::new(
            self.actions.clone(),
            assemblies,
            self.loader.clone(),
            ResolverConfig::default(),
        )
    }
}

#[tokio::test]
async fn register_add_resolve_end_to_end() {
    let world = World::new();
    let action_topic = world.publish_action().await;
    let block_topic = world.publish_block("panel", "<div>{count}</div>").await;

    let assembly_topic = world.transport.create_topic();
    let assemblies = world.assembly_registry(&assembly_topic);
    assemblies
        .register_assembly("A", Version::new(1, 0, 0), None, None)
        .await
        .unwrap();
    assemblies
        .add_action(action_topic.clone(), "x", None)
        .await
        .unwrap();
    assemblies
        .add_block(
            block_topic.clone(),
            Some(BTreeMap::from([("x".to_string(), action_topic.clone())])),
            None,
            None,
        )
        .await
        .unwrap();

    let resolver = world.resolver(assemblies);
    let assembly = resolver
        .load_and_resolve_assembly(&assembly_topic)
        .await
        .unwrap();

    assert_eq!(assembly.state.name, "A");
    assert_eq!(assembly.state.actions.len(), 1);
    assert_eq!(assembly.state.actions[0].alias, "x");
    assert_eq!(assembly.state.actions[0].topic, action_topic);
    assert_eq!(assembly.state.blocks.len(), 1);
    assert_eq!(assembly.state.blocks[0].topic, block_topic);

    let resolved_action = &assembly.actions[0];
    assert!(resolved_action.definition.is_some());
    assert!(resolved_action.error.is_none());

    let resolved_block = &assembly.blocks[0];
    assert_eq!(
        resolved_block.definition.as_ref().unwrap().name,
        "panel"
    );
    assert_eq!(
        resolved_block.template.as_deref(),
        Some("<div>{count}</div>")
    );

    let report = resolver.validate_composition(&assembly);
    assert!(report.valid, "unexpected errors: {:?}", report.errors);
}

#[tokio::test]
async fn dangling_references_resolve_partially_without_failing() {
    let world = World::new();
    let action_topic = world.publish_action().await;
    let missing_action = world.transport.create_topic();
    let missing_block = TopicId::new("cas-missing");

    let assembly_topic = world.transport.create_topic();
    let assemblies = world.assembly_registry(&assembly_topic);
    assemblies
        .register_assembly("A", Version::new(1, 0, 0), None, None)
        .await
        .unwrap();
    assemblies
        .add_action(action_topic, "good", None)
        .await
        .unwrap();
    assemblies
        .add_action(missing_action.clone(), "bad", None)
        .await
        .unwrap();
    assemblies
        .add_block(missing_block, None, None, None)
        .await
        .unwrap();

    let resolver = world.resolver(assemblies);
    let assembly = resolver.load_assembly(&assembly_topic).await.unwrap();

    assert_eq!(assembly.actions.len(), 2);
    assert!(assembly.actions[0].definition.is_some());
    assert!(assembly.actions[1].definition.is_none());
    assert_eq!(
        assembly.actions[1].error.as_deref(),
        Some(format!("Action not found at topic: {missing_action}").as_str())
    );

    assert!(assembly.blocks[0].definition.is_none());
    assert!(assembly.blocks[0].template.is_none());
    assert!(assembly.blocks[0].error.is_some());
}

#[tokio::test]
async fn repeated_loads_return_the_cached_object() {
    let world = World::new();
    let assembly_topic = world.transport.create_topic();
    let assemblies = world.assembly_registry(&assembly_topic);
    assemblies
        .register_assembly("A", Version::new(1, 0, 0), None, None)
        .await
        .unwrap();

    let resolver = world.resolver(assemblies);
    let first = resolver.load_assembly(&assembly_topic).await.unwrap();
    let reads_after_first = world.transport.read_calls();

    let second = resolver.load_assembly(&assembly_topic).await.unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(world.transport.read_calls(), reads_after_first);

    resolver.clear_cache().unwrap();
    let third = resolver.load_assembly(&assembly_topic).await.unwrap();
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(first.state, third.state);
}

#[tokio::test]
async fn unregistered_assembly_is_a_hard_error() {
    let world = World::new();
    let empty_topic = world.transport.create_topic();
    let assemblies = world.assembly_registry(&empty_topic);

    let resolver = world.resolver(assemblies);
    let err = resolver.load_assembly(&empty_topic).await.unwrap_err();
    assert!(matches!(
        err,
        trellis_resolver::ResolveError::AssemblyNotFound(_)
    ));
}

#[tokio::test]
async fn composition_errors_name_block_and_missing_alias() {
    let world = World::new();
    let block_topic = world.publish_block("panel", "<div/>").await;

    let assembly_topic = world.transport.create_topic();
    let assemblies = world.assembly_registry(&assembly_topic);
    assemblies
        .register_assembly("A", Version::new(1, 0, 0), None, None)
        .await
        .unwrap();
    assemblies
        .add_block(
            block_topic.clone(),
            None,
            None,
            Some(vec!["sidebar".to_string()]),
        )
        .await
        .unwrap();

    let resolver = world.resolver(assemblies);
    let assembly = resolver.load_assembly(&assembly_topic).await.unwrap();
    let report = resolver.validate_composition(&assembly);

    assert!(!report.valid);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(
        report.errors[0],
        format!("Block {block_topic} references non-existent child block: sidebar")
    );
}
