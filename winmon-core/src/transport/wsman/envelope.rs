//! SOAP envelopes for the WS-Management remote shell exchange

use std::time::Duration;

use quick_xml::escape::escape;
use uuid::Uuid;

/// SOAP 1.2 envelope namespace
pub const NS_SOAP: &str = "http://www.w3.org/2003/05/soap-envelope";
/// WS-Addressing namespace
pub const NS_ADDRESSING: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing";
/// DMTF WS-Management namespace
pub const NS_WSMAN: &str = "http://schemas.dmtf.org/wbem/wsman/1/wsman.xsd";
/// Microsoft WS-Management extensions namespace
pub const NS_WSMAN_MS: &str = "http://schemas.microsoft.com/wbem/wsman/1/wsman.xsd";
/// Windows remote shell namespace
pub const NS_SHELL: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell";

/// Resource URI of the `cmd` remote shell
pub const RESOURCE_CMD_SHELL: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/cmd";

const ANONYMOUS_ADDRESS: &str = "http://schemas.xmlsoap.org/ws/2004/08/addressing/role/anonymous";

const ACTION_CREATE: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Create";
const ACTION_DELETE: &str = "http://schemas.xmlsoap.org/ws/2004/09/transfer/Delete";
const ACTION_COMMAND: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Command";
const ACTION_RECEIVE: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Receive";
const ACTION_SIGNAL: &str = "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/Signal";

const SIGNAL_TERMINATE: &str =
    "http://schemas.microsoft.com/wbem/wsman/1/windows/shell/signal/terminate";

/// Largest envelope the server may send back
pub const MAX_ENVELOPE_SIZE: u32 = 153_600;

/// One outgoing WS-Management message
#[derive(Debug, Clone)]
pub struct Envelope<'a> {
    endpoint: &'a str,
    action: &'static str,
    operation_timeout: Duration,
    shell_id: Option<&'a str>,
    options: Vec<(&'static str, &'static str)>,
    body: String,
}

impl<'a> Envelope<'a> {
    fn new(endpoint: &'a str, action: &'static str, operation_timeout: Duration) -> Self {
        Self {
            endpoint,
            action,
            operation_timeout,
            shell_id: None,
            options: Vec::new(),
            body: String::new(),
        }
    }

    /// Creates a `cmd` shell with stdin in and stdout/stderr out
    #[must_use]
    pub fn create_shell(endpoint: &'a str, operation_timeout: Duration) -> Self {
        let mut env = Self::new(endpoint, ACTION_CREATE, operation_timeout);
        env.options = vec![("WINRS_NOPROFILE", "FALSE"), ("WINRS_CODEPAGE", "65001")];
        env.body = concat!(
            "<rsp:Shell>",
            "<rsp:InputStreams>stdin</rsp:InputStreams>",
            "<rsp:OutputStreams>stdout stderr</rsp:OutputStreams>",
            "</rsp:Shell>"
        )
        .to_string();
        env
    }

    /// Starts `command` with `arguments` inside an existing shell
    #[must_use]
    pub fn command(
        endpoint: &'a str,
        operation_timeout: Duration,
        shell_id: &'a str,
        command: &str,
        arguments: &[&str],
    ) -> Self {
        let mut env = Self::new(endpoint, ACTION_COMMAND, operation_timeout);
        env.shell_id = Some(shell_id);
        env.options = vec![
            ("WINRS_CONSOLEMODE_STDIN", "TRUE"),
            ("WINRS_SKIP_CMD_SHELL", "FALSE"),
        ];
        let mut body = String::from("<rsp:CommandLine>");
        body.push_str(&format!("<rsp:Command>{}</rsp:Command>", escape(command)));
        for arg in arguments {
            body.push_str(&format!("<rsp:Arguments>{}</rsp:Arguments>", escape(*arg)));
        }
        body.push_str("</rsp:CommandLine>");
        env.body = body;
        env
    }

    /// Polls stdout and stderr of a running command
    #[must_use]
    pub fn receive(
        endpoint: &'a str,
        operation_timeout: Duration,
        shell_id: &'a str,
        command_id: &str,
    ) -> Self {
        let mut env = Self::new(endpoint, ACTION_RECEIVE, operation_timeout);
        env.shell_id = Some(shell_id);
        env.options = vec![("WSMAN_CMDSHELL_OPTION_KEEPALIVE", "TRUE")];
        env.body = format!(
            "<rsp:Receive><rsp:DesiredStream CommandId=\"{}\">stdout stderr</rsp:DesiredStream></rsp:Receive>",
            escape(command_id)
        );
        env
    }

    /// Terminates a command
    #[must_use]
    pub fn signal_terminate(
        endpoint: &'a str,
        operation_timeout: Duration,
        shell_id: &'a str,
        command_id: &str,
    ) -> Self {
        let mut env = Self::new(endpoint, ACTION_SIGNAL, operation_timeout);
        env.shell_id = Some(shell_id);
        env.body = format!(
            "<rsp:Signal CommandId=\"{}\"><rsp:Code>{SIGNAL_TERMINATE}</rsp:Code></rsp:Signal>",
            escape(command_id)
        );
        env
    }

    /// Deletes a shell
    #[must_use]
    pub fn delete_shell(endpoint: &'a str, operation_timeout: Duration, shell_id: &'a str) -> Self {
        let mut env = Self::new(endpoint, ACTION_DELETE, operation_timeout);
        env.shell_id = Some(shell_id);
        env
    }

    /// Serializes the envelope with a fresh message id
    #[must_use]
    pub fn render(&self) -> String {
        self.render_with_id(Uuid::new_v4())
    }

    fn render_with_id(&self, message_id: Uuid) -> String {
        let mut xml = String::with_capacity(1024 + self.body.len());
        xml.push_str(&format!(
            "<s:Envelope xmlns:s=\"{NS_SOAP}\" xmlns:a=\"{NS_ADDRESSING}\" \
             xmlns:w=\"{NS_WSMAN}\" xmlns:p=\"{NS_WSMAN_MS}\" xmlns:rsp=\"{NS_SHELL}\">"
        ));
        xml.push_str("<s:Header>");
        xml.push_str(&format!("<a:To>{}</a:To>", escape(self.endpoint)));
        xml.push_str(&format!(
            "<a:ReplyTo><a:Address s:mustUnderstand=\"true\">{ANONYMOUS_ADDRESS}</a:Address></a:ReplyTo>"
        ));
        xml.push_str(&format!(
            "<w:MaxEnvelopeSize s:mustUnderstand=\"true\">{MAX_ENVELOPE_SIZE}</w:MaxEnvelopeSize>"
        ));
        xml.push_str(&format!("<a:MessageID>uuid:{message_id}</a:MessageID>"));
        xml.push_str("<w:Locale xml:lang=\"en-US\" s:mustUnderstand=\"false\"/>");
        xml.push_str("<p:DataLocale xml:lang=\"en-US\" s:mustUnderstand=\"false\"/>");
        xml.push_str(&format!(
            "<w:OperationTimeout>PT{}S</w:OperationTimeout>",
            self.operation_timeout.as_secs()
        ));
        xml.push_str(&format!(
            "<w:ResourceURI s:mustUnderstand=\"true\">{RESOURCE_CMD_SHELL}</w:ResourceURI>"
        ));
        xml.push_str(&format!(
            "<a:Action s:mustUnderstand=\"true\">{}</a:Action>",
            self.action
        ));
        if let Some(shell_id) = self.shell_id {
            xml.push_str(&format!(
                "<w:SelectorSet><w:Selector Name=\"ShellId\">{}</w:Selector></w:SelectorSet>",
                escape(shell_id)
            ));
        }
        if !self.options.is_empty() {
            xml.push_str("<w:OptionSet>");
            for (name, value) in &self.options {
                xml.push_str(&format!("<w:Option Name=\"{name}\">{value}</w:Option>"));
            }
            xml.push_str("</w:OptionSet>");
        }
        xml.push_str("</s:Header>");
        if self.body.is_empty() {
            xml.push_str("<s:Body/>");
        } else {
            xml.push_str("<s:Body>");
            xml.push_str(&self.body);
            xml.push_str("</s:Body>");
        }
        xml.push_str("</s:Envelope>");
        xml
    }

    /// SOAP action URI
    #[must_use]
    pub const fn action(&self) -> &'static str {
        self.action
    }
}
