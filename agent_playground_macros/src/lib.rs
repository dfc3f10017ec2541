use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

/// Declares a tool from a name, a description, a params struct and an async closure.
///
/// The params struct must implement `serde::Deserialize` and `schemars::JsonSchema`.
/// Field doc comments end up as parameter descriptions in the generated schema.
/// The closure receives the decoded params and returns `Result<serde_json::Value, String>`;
/// an `Err` becomes `AgentError::ToolExecution`.
///
/// The generated unit struct is named after the tool in PascalCase
/// (`unit_converter` becomes `UnitConverter`).
#[proc_macro]
pub fn tool(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ToolDefinition);

    let name = input.name;
    let description = input.description;
    let params_type = input.params_type;
    let execute_body = input.execute_body;

    let struct_name = pascal_case(&name.value());
    if struct_name.is_empty() {
        return syn::Error::new_spanned(&name, "tool name must contain an identifier")
            .to_compile_error()
            .into();
    }

    let tool_struct = quote::format_ident!("{}", struct_name);

    let expanded = quote! {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct #tool_struct;

        impl agent_playground::tools::Tool for #tool_struct {
            fn name(&self) -> &'static str {
                #name
            }

            fn description(&self) -> &'static str {
                #description
            }

            fn parameters_schema(&self) -> serde_json::Value {
                agent_playground::tools::schema::parameters_for::<#params_type>()
            }

            fn execute(
                &self,
                parameters: serde_json::Value,
            ) -> std::pin::Pin<
                Box<
                    dyn std::future::Future<
                            Output = Result<serde_json::Value, agent_playground::AgentError>,
                        > + Send
                        + '_,
                >,
            > {
                Box::pin(async move {
                    let params: #params_type =
                        agent_playground::tools::schema::decode_params(#name, parameters)?;

                    let handler = #execute_body;
                    handler(params)
                        .await
                        .map_err(agent_playground::AgentError::ToolExecution)
                })
            }
        }
    };

    TokenStream::from(expanded)
}

fn pascal_case(name: &str) -> String {
    name.split(|c: char| c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

struct ToolDefinition {
    name: syn::LitStr,
    description: syn::LitStr,
    params_type: syn::Type,
    execute_body: syn::ExprClosure,
}

fn parse_named_assignment<T: syn::parse::Parse>(
    input: syn::parse::ParseStream,
    keyword: &str,
) -> syn::Result<T> {
    let ident: syn::Ident = input.parse()?;
    if ident != keyword {
        return Err(syn::Error::new_spanned(
            ident,
            format!("expected '{keyword}'"),
        ));
    }
    input.parse::<syn::Token![=]>()?;
    let value = input.parse::<T>()?;
    input.parse::<syn::Token![,]>()?;
    Ok(value)
}

impl syn::parse::Parse for ToolDefinition {
    fn parse(input: syn::parse::ParseStream) -> syn::Result<Self> {
        let name = parse_named_assignment::<syn::LitStr>(input, "name")?;
        let description = parse_named_assignment::<syn::LitStr>(input, "description")?;
        let params_type = parse_named_assignment::<syn::Type>(input, "params")?;
        let execute_body: syn::ExprClosure = input.parse()?;
        // allow a trailing comma after the closure
        let _ = input.parse::<Option<syn::Token![,]>>()?;

        Ok(ToolDefinition {
            name,
            description,
            params_type,
            execute_body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::pascal_case;

    #[test]
    fn converts_snake_case_tool_names() {
        assert_eq!(pascal_case("unit_converter"), "UnitConverter");
        assert_eq!(pascal_case("get_weather_info"), "GetWeatherInfo");
        assert_eq!(pascal_case("simple-http_request"), "SimpleHttpRequest");
        assert_eq!(pascal_case("__"), "");
    }
}
