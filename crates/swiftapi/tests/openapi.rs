//! Documentation generated by a built application.

use swiftapi::core::{AuthScheme, SecurityOptions};
use swiftapi::docs::SchemaGenerator;
use swiftapi::prelude::*;

struct Unused;

#[async_trait::async_trait]
impl ServiceInstance for Unused {
    async fn invoke(
        &mut self,
        _action: &str,
        _args: Arguments,
        _ctx: &RequestContext,
    ) -> SwiftResult<ActionResult> {
        Ok(ActionResult::Empty)
    }
}

fn app(config: SwiftApiConfig) -> SwiftApi {
    let customer = Model::new("Customer")
        .property("id", TypeDescriptor::Uuid)
        .property("name", TypeDescriptor::String)
        .property("referrer", TypeDescriptor::nullable(TypeDescriptor::named("Customer")))
        .property("avatar", TypeDescriptor::File);

    SwiftApi::builder()
        .contract(
            Contract::builder("Customers")
                .action(
                    Action::get("GetCustomer")
                        .param(Parameter::route("id", TypeDescriptor::Uuid))
                        .returns(TypeDescriptor::named("Customer")),
                )
                .action(
                    Action::post("Save")
                        .param(Parameter::body("customer", TypeDescriptor::named("Customer")))
                        .secure(SecurityRequirement::roles(["admin"])),
                )
                .action(Action::get("Ping").open())
                .build(),
        )
        .model(customer)
        .resolver(ServiceContainer::new().with("Customers", || Unused))
        .config(config)
        .build()
        .unwrap()
}

#[test]
fn test_document_covers_every_route() {
    let app = app(SwiftApiConfig::default());
    let doc = app.openapi();

    assert_eq!(doc.info.title, "SwiftAPI");
    let paths: Vec<&str> = doc.paths.keys().map(String::as_str).collect();
    assert_eq!(
        paths,
        vec![
            "/api/customers/get_customer/{id}",
            "/api/customers/save",
            "/api/customers/ping"
        ]
    );

    let get = doc.paths["/api/customers/get_customer/{id}"].get.as_ref().unwrap();
    assert_eq!(get.operation_id, "customers_getcustomer");
    assert_eq!(get.tags, vec!["CUSTOMERS"]);
    assert!(doc.components.as_ref().unwrap().schemas.contains_key("Customer"));
}

#[test]
fn test_security_listed_only_where_required() {
    let mut config = SwiftApiConfig::default();
    config.security = SecurityOptions::new(AuthScheme::Bearer);
    let app = app(config);
    let doc = app.openapi();

    let save = doc.paths["/api/customers/save"].post.as_ref().unwrap();
    assert_eq!(save.security.len(), 1);
    assert!(save.security[0].contains_key("Bearer"));

    let ping = doc.paths["/api/customers/ping"].get.as_ref().unwrap();
    assert!(ping.security.is_empty());
}

#[test]
fn test_schema_generation_is_idempotent() {
    let app = app(SwiftApiConfig::default());
    let generator = SchemaGenerator::new(app.registry().catalog());
    let ty = TypeDescriptor::named("Customer");

    let first = generator.generate(&ty);
    let second = generator.generate(&ty);
    assert_eq!(first, second);

    let fresh = SchemaGenerator::new(app.registry().catalog()).generate(&ty);
    assert_eq!(first, fresh);
}

#[test]
fn test_invalid_security_settings_fail_the_build() {
    let mut config = SwiftApiConfig::default();
    config.security = SecurityOptions::new(AuthScheme::OpenIdConnect);

    let err = SwiftApi::builder()
        .contract(Contract::builder("Customers").action(Action::get("Ping")).build())
        .resolver(ServiceContainer::new().with("Customers", || Unused))
        .config(config)
        .build()
        .unwrap_err();
    assert!(err.to_string().contains("openid_connect_url"), "{err}");
}
