//! Well-known service names accepted in place of port numbers.

/// Look up a well-known service name.
pub fn well_known_port(name: &str) -> Option<u16> {
    let port = match name {
        "http" | "www" => 80,
        "https" => 443,
        "ssh" => 22,
        "telnet" => 23,
        "smtp" => 25,
        "dns" | "domain" => 53,
        "dhcp" | "bootps" => 67,
        "bootpc" => 68,
        "tftp" => 69,
        "ftp" => 21,
        "ftp-data" => 20,
        "pop2" | "pop-2" => 109,
        "pop3" | "pop-3" => 110,
        "imap" | "imap2" => 143,
        "snmp" => 161,
        "snmptrap" => 162,
        "ldap" => 389,
        "ldaps" => 636,
        "https-alt" => 8443,
        "mysql" => 3306,
        "rdp" => 3389,
        "kerberos" => 88,
        "kpasswd" => 464,
        "msrpc" | "loc-srv" => 135,
        "netbios-ns" => 137,
        "netbios-dgm" => 138,
        "netbios-ssn" | "netbios-ss" => 139,
        "smb" | "microsoft-ds" => 445,
        "citrix" | "citrix-ica" | "citrix-xenapp" => 1494,
        "ntp" => 123,
        "time" => 37,
        "daytime" => 13,
        "chargen" => 19,
        "echo" => 7,
        "discard" => 9,
        "systat" => 11,
        "finger" => 79,
        "whois" => 43,
        "nameserver" => 42,
        "tacacs" => 49,
        "gopher" => 70,
        "rje" => 77,
        "hostname" => 101,
        "iso-tsap" => 102,
        "acr-nema" => 104,
        "csnet-ns" => 105,
        "rtelnet" => 107,
        "sunrpc" => 111,
        "ident" | "auth" => 113,
        "sftp" => 115,
        "uucp-path" => 117,
        "nntp" => 119,
        "pwdgen" => 129,
        "news" => 144,
        "lpd" => 515,
        "cmd" | "syslog" => 514,
        _ => return None,
    };
    Some(port)
}

/// Resolve a port token that is either numeric or a well-known name.
pub fn resolve_port(token: &str) -> Option<u16> {
    token.parse::<u16>().ok().or_else(|| well_known_port(token))
}
