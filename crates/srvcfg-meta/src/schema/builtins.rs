//! Built-in catalog of common server elements

use super::{AttributeType, ElementKind, ElementSchema};

use AttributeType::{Boolean, Duration, Int, String as Str};
use ElementKind::{KeyedFactory, Singleton, UnkeyedFactory};

fn reference(target: &str) -> AttributeType {
    AttributeType::Reference(target.to_string())
}

fn one_of(values: &[&str]) -> AttributeType {
    AttributeType::Enum(values.iter().map(|v| v.to_string()).collect())
}

fn list_of(inner: AttributeType) -> AttributeType {
    AttributeType::List(Box::new(inner))
}

/// Entries registered by [`crate::SchemaMetadata::with_builtins`].
pub fn builtin_elements() -> Vec<ElementSchema> {
    vec![
        ElementSchema::new("server", Singleton).attribute("description", Str),
        ElementSchema::new("featureManager", Singleton)
            .attribute("onError", one_of(&["WARN", "FAIL", "IGNORE"])),
        ElementSchema::new("feature", UnkeyedFactory),
        ElementSchema::new("include", UnkeyedFactory)
            .attribute("location", Str)
            .attribute("optional", Boolean)
            .attribute("onConflict", one_of(&["MERGE", "IGNORE", "REPLACE"])),
        ElementSchema::new("variable", UnkeyedFactory)
            .attribute("name", Str)
            .attribute("value", Str)
            .attribute("defaultValue", Str),
        ElementSchema::new("httpEndpoint", KeyedFactory)
            .attribute("host", Str)
            .attribute("httpPort", Int)
            .attribute("httpsPort", Int)
            .attribute("enabled", Boolean)
            .attribute("httpOptionsRef", reference("httpOptions"))
            .attribute("sslOptionsRef", reference("sslOptions"))
            .attribute("tcpOptionsRef", reference("tcpOptions")),
        ElementSchema::new("httpOptions", KeyedFactory)
            .attribute("keepAliveEnabled", Boolean)
            .attribute("maxKeepAliveRequests", Int)
            .attribute("persistTimeout", Duration)
            .attribute("readTimeout", Duration)
            .attribute("writeTimeout", Duration),
        ElementSchema::new("tcpOptions", KeyedFactory)
            .attribute("inactivityTimeout", Duration)
            .attribute("soReuseAddr", Boolean),
        ElementSchema::new("logging", Singleton)
            .attribute("consoleLogLevel", one_of(&["INFO", "AUDIT", "WARNING", "ERROR", "OFF"]))
            .attribute("traceSpecification", Str)
            .attribute("logDirectory", Str)
            .attribute("maxFileSize", Int)
            .attribute("maxFiles", Int),
        ElementSchema::new("application", KeyedFactory)
            .attribute("name", Str)
            .attribute("location", Str)
            .attribute("type", Str)
            .attribute("context-root", Str)
            .attribute("autoStart", Boolean),
        ElementSchema::new("webApplication", KeyedFactory)
            .attribute("name", Str)
            .attribute("location", Str)
            .attribute("contextRoot", Str)
            .attribute("autoStart", Boolean)
            .requires(&["servlet", "webProfile", "jakartaee", "javaee"]),
        ElementSchema::new("applicationManager", Singleton)
            .attribute("autoExpand", Boolean)
            .attribute("startTimeout", Duration)
            .attribute("stopTimeout", Duration),
        ElementSchema::new("applicationMonitor", Singleton)
            .attribute("pollingRate", Duration)
            .attribute("dropinsEnabled", Boolean)
            .attribute("updateTrigger", one_of(&["polled", "mbean", "disabled"])),
        ElementSchema::new("config", Singleton)
            .attribute("monitorInterval", Duration)
            .attribute("updateTrigger", one_of(&["polled", "mbean", "disabled"])),
        ElementSchema::new("dataSource", KeyedFactory)
            .attribute("jndiName", Str)
            .attribute("jdbcDriverRef", reference("jdbcDriver"))
            .attribute("connectionManagerRef", reference("connectionManager"))
            .attribute("transactional", Boolean)
            .attribute("queryTimeout", Duration)
            .requires(&["jdbc"]),
        ElementSchema::new("jdbcDriver", KeyedFactory)
            .attribute("libraryRef", reference("library"))
            .requires(&["jdbc"]),
        ElementSchema::new("connectionManager", KeyedFactory)
            .attribute("maxPoolSize", Int)
            .attribute("minPoolSize", Int)
            .attribute("connectionTimeout", AttributeType::Union(vec![Duration, one_of(&["-1"])]))
            .attribute("agedTimeout", AttributeType::Union(vec![Duration, one_of(&["-1"])]))
            .requires(&["jdbc", "connectors"]),
        ElementSchema::new("library", KeyedFactory)
            .attribute("name", Str)
            .attribute("filesetRef", list_of(reference("fileset"))),
        ElementSchema::new("fileset", KeyedFactory)
            .attribute("dir", Str)
            .attribute("includes", Str)
            .attribute("excludes", Str)
            .attribute("scanInterval", Duration),
        ElementSchema::new("properties", UnkeyedFactory).open(),
        ElementSchema::new("keyStore", KeyedFactory)
            .attribute("location", Str)
            .attribute("password", Str)
            .attribute("type", Str)
            .attribute("readOnly", Boolean)
            .attribute("pollingRate", Duration),
        ElementSchema::new("ssl", KeyedFactory)
            .attribute("keyStoreRef", reference("keyStore"))
            .attribute("trustStoreRef", reference("keyStore"))
            .attribute("sslProtocol", Str)
            .attribute("clientAuthentication", Boolean)
            .requires(&["ssl", "transportSecurity"]),
        ElementSchema::new("sslDefault", Singleton)
            .attribute("sslRef", reference("ssl"))
            .requires(&["ssl", "transportSecurity"]),
        ElementSchema::new("sslOptions", KeyedFactory)
            .attribute("sslRef", reference("ssl"))
            .attribute("sessionTimeout", Duration)
            .requires(&["ssl", "transportSecurity"]),
        ElementSchema::new("basicRegistry", KeyedFactory)
            .attribute("realm", Str)
            .attribute("ignoreCaseForAuthentication", Boolean),
        ElementSchema::new("user", KeyedFactory)
            .attribute("name", Str)
            .attribute("password", Str),
        ElementSchema::new("group", KeyedFactory).attribute("name", Str),
        ElementSchema::new("member", UnkeyedFactory).attribute("name", Str),
        ElementSchema::new("quickStartSecurity", Singleton)
            .attribute("userName", Str)
            .attribute("userPassword", Str),
        ElementSchema::new("executor", Singleton)
            .attribute("coreThreads", Int)
            .attribute("maxThreads", Int)
            .attribute("keepAlive", Duration)
            .attribute("stealPolicy", one_of(&["STRICT", "LOCAL", "NEVER"])),
        ElementSchema::new("jndiEntry", KeyedFactory)
            .attribute("jndiName", Str)
            .attribute("value", Str)
            .attribute("decode", Boolean)
            .requires(&["jndi"]),
        ElementSchema::new("webContainer", Singleton)
            .attribute("deferServletLoad", Boolean)
            .attribute("disableXPoweredBy", Boolean)
            .requires(&["servlet", "webProfile", "jakartaee", "javaee"]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn builtin_names_are_unique() {
        let elements = builtin_elements();
        let names: HashSet<_> = elements.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names.len(), elements.len());
    }

    #[test]
    fn references_point_at_known_elements() {
        let elements = builtin_elements();
        let names: HashSet<_> = elements.iter().map(|e| e.name.clone()).collect();
        fn targets(ty: &AttributeType, out: &mut Vec<String>) {
            match ty {
                AttributeType::Reference(target) => out.push(target.clone()),
                AttributeType::List(inner) => targets(inner, out),
                AttributeType::Union(alts) => alts.iter().for_each(|a| targets(a, out)),
                _ => {}
            }
        }
        for element in &elements {
            for ty in element.attributes.values() {
                let mut found = Vec::new();
                targets(ty, &mut found);
                for target in found {
                    assert!(names.contains(&target), "{}: unknown target {target}", element.name);
                }
            }
        }
    }
}
