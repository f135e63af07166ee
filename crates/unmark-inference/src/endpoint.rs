use unmark_core::Config;

/// One version of the inference API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub version: String,
    pub url: String,
    /// Request field that carries the source URL
    pub input_field: String,
}

impl EndpointDescriptor {
    pub fn new(
        version: impl Into<String>,
        url: impl Into<String>,
        input_field: impl Into<String>,
    ) -> Self {
        Self {
            version: version.into(),
            url: url.into(),
            input_field: input_field.into(),
        }
    }
}

/// Endpoints in the order they are tried. Never empty.
#[derive(Debug, Clone)]
pub struct EndpointChain {
    primary: EndpointDescriptor,
    fallbacks: Vec<EndpointDescriptor>,
}

impl EndpointChain {
    pub fn new(primary: EndpointDescriptor, fallbacks: Vec<EndpointDescriptor>) -> Self {
        Self { primary, fallbacks }
    }

    /// v2 first, then v1.
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EndpointDescriptor::new(
                "v2",
                config.inference_v2_url.clone(),
                config.inference_input_field.clone(),
            ),
            vec![EndpointDescriptor::new(
                "v1",
                config.inference_v1_url.clone(),
                config.inference_input_field.clone(),
            )],
        )
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        std::iter::once(&self.primary).chain(self.fallbacks.iter())
    }

    pub fn len(&self) -> usize {
        1 + self.fallbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// The final fallback; the URL-shape retry is sent here.
    pub fn last(&self) -> &EndpointDescriptor {
        self.fallbacks.last().unwrap_or(&self.primary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_order() {
        let chain = EndpointChain::from_config(&Config::default());
        let versions: Vec<&str> = chain.iter().map(|e| e.version.as_str()).collect();
        assert_eq!(versions, vec!["v2", "v1"]);
        assert_eq!(chain.last().version, "v1");
        assert!(chain.iter().all(|e| e.input_field == "input"));
    }

    #[test]
    fn test_single_endpoint_is_its_own_last() {
        let only = EndpointDescriptor::new("v1", "http://localhost/v1", "input_video");
        let chain = EndpointChain::new(only.clone(), vec![]);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.last(), &only);
    }
}
